//! Placeholder template rendering.
//!
//! One capability: read a named template from the views directory and
//! substitute `{{key}}` placeholders. No inheritance, no logic, no escaping —
//! it renders trusted, bundled templates only.

use std::io;
use std::path::PathBuf;

use tokio::fs;

/// Renders `{{key}}` placeholder templates from a directory of `.html` files.
pub struct Viewer {
    dir: PathBuf,
}

impl Viewer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Renders template `name` (resolved as `<dir>/<name>.html`), replacing
    /// every `{{key}}` with its value. Newlines in values become `<br>` so
    /// multi-line content survives HTML whitespace collapsing.
    pub async fn render(&self, name: &str, data: &[(&str, &str)]) -> io::Result<String> {
        let path = self.dir.join(format!("{name}.html"));
        let mut html = fs::read_to_string(path).await?;
        for (key, value) in data {
            let value = value.replace("\r\n", "<br>").replace('\n', "<br>");
            html = html.replace(&format!("{{{{{key}}}}}"), &value);
        }
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn substitutes_every_occurrence_of_each_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("page.html"),
            "<title>{{title}}</title><h1>{{title}}</h1><p>{{content}}</p>",
        )
        .unwrap();

        let viewer = Viewer::new(dir.path());
        let html = viewer
            .render("page", &[("title", "dragons"), ("content", "fire\nand gold")])
            .await
            .unwrap();

        assert_eq!(
            html,
            "<title>dragons</title><h1>dragons</h1><p>fire<br>and gold</p>"
        );
    }

    #[tokio::test]
    async fn missing_template_surfaces_the_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = Viewer::new(dir.path());
        assert!(viewer.render("absent", &[]).await.is_err());
    }
}
