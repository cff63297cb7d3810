//! Static file serving from a fixed root directory.
//!
//! A thin collaborator the dispatcher falls back to when no route matched a
//! read-only request. Content types derive from the file extension; unknown
//! extensions default to `application/octet-stream`. A path that names a
//! directory is retried with an implicit `index.html`.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

/// The outcome of a static lookup, classified for the dispatcher.
pub(crate) enum Lookup {
    Found { content_type: &'static str, body: Vec<u8> },
    /// The file does not exist — answered as 404.
    Missing,
    /// Any other I/O failure — answered as 500.
    Failed,
}

pub(crate) struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Looks up `path` under the root directory.
    pub(crate) async fn lookup(&self, path: &str) -> Lookup {
        // The root directory is the boundary; never follow `..` out of it.
        if path.split('/').any(|segment| segment == "..") {
            return Lookup::Missing;
        }

        let mut target = path.to_owned();
        loop {
            if target.ends_with('/') || target.is_empty() {
                target.push_str("index.html");
            }

            let file_path = self.root.join(target.trim_start_matches('/'));
            match fs::read(&file_path).await {
                Ok(body) => {
                    return Lookup::Found { content_type: content_type(&target), body };
                }
                Err(e) => match e.kind() {
                    ErrorKind::NotFound => return Lookup::Missing,
                    // A directory: retry with the implicit index file.
                    ErrorKind::IsADirectory => target.push('/'),
                    _ => return Lookup::Failed,
                },
            }
        }
    }
}

/// Extension-derived content type, matching what the dispatcher serves.
fn content_type(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt")  => "text/plain",
        Some("html") => "text/html",
        Some("css")  => "text/css",
        Some("js")   => "text/javascript",
        Some("jpg")  => "image/jpeg",
        Some("png")  => "image/png",
        _            => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, StaticFiles) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi there").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<h1>docs</h1>").unwrap();
        let files = StaticFiles::new(dir.path());
        (dir, files)
    }

    #[tokio::test]
    async fn serves_a_file_with_its_content_type() {
        let (_dir, files) = fixture();
        match files.lookup("/hello.txt").await {
            Lookup::Found { content_type, body } => {
                assert_eq!(content_type, "text/plain");
                assert_eq!(body, b"hi there");
            }
            _ => panic!("expected a file"),
        }
    }

    #[tokio::test]
    async fn missing_files_classify_as_missing() {
        let (_dir, files) = fixture();
        assert!(matches!(files.lookup("/nope.txt").await, Lookup::Missing));
    }

    #[tokio::test]
    async fn directories_fall_back_to_index_html() {
        let (_dir, files) = fixture();
        for path in ["/docs", "/docs/"] {
            match files.lookup(path).await {
                Lookup::Found { content_type, body } => {
                    assert_eq!(content_type, "text/html");
                    assert_eq!(body, b"<h1>docs</h1>");
                }
                _ => panic!("expected the index file for {path}"),
            }
        }
    }

    #[tokio::test]
    async fn unknown_extensions_default_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0u8, 1, 2]).unwrap();
        let files = StaticFiles::new(dir.path());
        match files.lookup("/blob.bin").await {
            Lookup::Found { content_type, .. } => {
                assert_eq!(content_type, "application/octet-stream");
            }
            _ => panic!("expected the blob"),
        }
    }

    #[tokio::test]
    async fn dot_dot_never_escapes_the_root() {
        let (_dir, files) = fixture();
        assert!(matches!(files.lookup("/../secret").await, Lookup::Missing));
    }
}
