//! Credential resolution

mod env_provider;

pub use env_provider::EnvCredentialProvider;
