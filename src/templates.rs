use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        let template_dir = std::path::Path::new("templates");
        let Ok(entries) = std::fs::read_dir(template_dir) else {
            tracing::warn!("no templates directory; pages will render as plain errors");
            return tera;
        };

        let files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "html"))
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?.to_string();
                Some((p, Some(name)))
            })
            .collect();

        if let Err(e) = tera.add_template_files(files) {
            tracing::error!("Failed to load templates: {}", e);
        }
        tera
    })
}
