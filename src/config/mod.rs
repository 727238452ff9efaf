pub mod settings;

pub use settings::ApiSettings;
