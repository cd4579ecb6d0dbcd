pub mod file;
mod keys;

pub use keys::KeyStore;
