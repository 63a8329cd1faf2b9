use std::path::PathBuf;

use crate::certificate::render::Layout;
use crate::fonts::FontConfig;

/// Template keys offered on the upload form and the image each one selects.
pub const TEMPLATE_FILES: &[(&str, &str)] = &[
    ("template1", "Template1.jpeg"),
    ("template3", "Template3.jpg"),
    ("template4", "Template4.jpg"),
    ("template5", "Template5.jpeg"),
    ("template6", "Template6.jpeg"),
];

#[derive(Clone)]
pub struct Config {
    pub upload_folder: PathBuf,
    pub results_folder: PathBuf,
    pub template_folder: PathBuf,
    pub fonts: FontConfig,
    pub layout: Layout,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads/excel".to_string())
        );
        let results_folder = base_dir.join(
            std::env::var("RESULTS_FOLDER").unwrap_or_else(|_| "generated_certificates".to_string())
        );
        let template_folder = base_dir.join(
            std::env::var("TEMPLATE_FOLDER").unwrap_or_else(|_| "static".to_string())
        );

        let fonts = FontConfig::resolve(
            std::env::var_os("FONT_REGULAR").map(PathBuf::from),
            std::env::var_os("FONT_BOLD").map(PathBuf::from),
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid port number")?;

        Ok(Self {
            upload_folder,
            results_folder,
            template_folder,
            fonts,
            layout: Layout::default(),
            host,
            port,
        })
    }

    /// Image path for a template key from the upload form.
    pub fn template_path(&self, key: &str) -> Option<PathBuf> {
        TEMPLATE_FILES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, file)| self.template_folder.join(file))
    }
}
