//! Platform-specific plumbing: HTTP clients, the InnerTube API, renderer
//! tree navigation, the itag catalog and signature deobfuscation

pub mod client;
pub mod deobfuscate;
pub mod innertube;
pub mod itags;
pub mod renderer;

pub use client::{ClientType, HttpClientConfig, PlatformClient};
pub use deobfuscate::Deobfuscator;
pub use innertube::InnerTube;
