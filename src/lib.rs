pub mod generator;
pub mod json;
pub mod links;
pub mod metrics;
pub mod strength;
pub mod text;
pub mod units;
pub mod vault;

pub use generator::{PasswordConfig, generate_password};
pub use metrics::PerformanceMonitor;
pub use strength::{
    Strength, StrengthResult, analyze_strength, calculate_entropy, estimate_crack_time,
};
pub use vault::{EncryptedData, decrypt_password, encrypt_password};
