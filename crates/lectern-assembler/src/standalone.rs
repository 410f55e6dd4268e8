use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::{Captures, NoExpand, Regex};
use std::fs;
use std::path::Path;

/// Inline the page stylesheet, replacing the `<link rel="stylesheet">` tag
/// with a `<style>` block. Local single-quoted `@import` statements are
/// resolved one level deep first, relative to the stylesheet's directory.
pub(crate) fn inline_stylesheet(html: &str, css_path: &Path) -> Result<String> {
    let css = fs::read_to_string(css_path)
        .with_context(|| format!("Failed to read {}", css_path.display()))?;
    let base_dir = css_path.parent().unwrap_or_else(|| Path::new("."));
    let css = resolve_imports(&css, base_dir)?;

    let link_re =
        Regex::new(r#"<link\s+rel=["']stylesheet["']\s+href=["'][^"']+\.css["']\s*/?>"#)?;
    let style_block = format!("<style>\n{css}\n</style>");
    Ok(link_re.replace(html, NoExpand(&style_block)).into_owned())
}

/// Splice imported stylesheets into `css`. Imports that cannot be read are
/// left as-is.
fn resolve_imports(css: &str, base_dir: &Path) -> Result<String> {
    let import_re = Regex::new(r"@import\s+'([^']+\.css)'\s*;")?;
    let resolved = import_re.replace_all(css, |caps: &Captures| {
        match fs::read_to_string(base_dir.join(&caps[1])) {
            Ok(content) => content,
            Err(_) => caps[0].to_string(),
        }
    });
    Ok(resolved.into_owned())
}

/// Rewrite `src="…"` references to base64 data URIs so the page carries its
/// images. Paths resolve relative to `base_dir` (the build output directory,
/// matching how the browser resolves them). `data:` and `http(s)` sources are
/// left untouched; unreadable files warn and keep their original reference.
pub(crate) fn embed_images(html: &str, base_dir: &Path) -> Result<(String, usize)> {
    let src_re = Regex::new(r#"src=["']([^"']+)["']"#)?;
    let mut embedded = 0usize;

    let result = src_re.replace_all(html, |caps: &Captures| {
        let src = &caps[1];
        if src.starts_with("data:") || src.starts_with("http") {
            return caps[0].to_string();
        }
        match to_data_uri(&base_dir.join(src)) {
            Ok(uri) => {
                embedded += 1;
                format!(r#"src="{uri}""#)
            }
            Err(e) => {
                println!("  Warning: could not embed {src}: {e}");
                caps[0].to_string()
            }
        }
    });

    Ok((result.into_owned(), embedded))
}

fn to_data_uri(path: &Path) -> std::io::Result<String> {
    let data = fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type(path),
        STANDARD.encode(data)
    ))
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_mime_type_by_extension() {
        assert_eq!(mime_type(Path::new("a.png")), "image/png");
        assert_eq!(mime_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_type(Path::new("a.woff2")), "font/woff2");
        assert_eq!(mime_type(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_resolve_imports_splices_local_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tokens.css"), ":root { --x: 1; }").unwrap();
        let css = "@import 'tokens.css';\nbody { margin: 0; }";
        let resolved = resolve_imports(css, dir.path()).unwrap();
        assert!(resolved.contains("--x: 1"));
        assert!(!resolved.contains("@import 'tokens.css'"));
        assert!(resolved.contains("body { margin: 0; }"));
    }

    #[test]
    fn test_resolve_imports_keeps_missing_imports() {
        let dir = tempdir().unwrap();
        let css = "@import 'nope.css';";
        let resolved = resolve_imports(css, dir.path()).unwrap();
        assert_eq!(resolved, css);
    }

    #[test]
    fn test_inline_stylesheet_replaces_link_tag() {
        let dir = tempdir().unwrap();
        let css_path = dir.path().join("style.css");
        fs::write(&css_path, "h1 { color: red; }").unwrap();
        let html = r#"<head><link rel="stylesheet" href="../css/style.css"></head>"#;
        let inlined = inline_stylesheet(html, &css_path).unwrap();
        assert!(inlined.contains("<style>"));
        assert!(inlined.contains("color: red"));
        assert!(!inlined.contains("<link"));
    }

    #[test]
    fn test_embed_images_encodes_local_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images/dot.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
        let html = r#"<img src="images/dot.png">"#;
        let (out, count) = embed_images(html, dir.path()).unwrap();
        assert_eq!(count, 1);
        assert!(out.contains("data:image/png;base64,"));
        assert!(!out.contains("images/dot.png"));
    }

    #[test]
    fn test_embed_images_skips_remote_and_data_sources() {
        let dir = tempdir().unwrap();
        let html = r#"<img src="https://example.com/a.png"><img src="data:image/png;base64,AAAA">"#;
        let (out, count) = embed_images(html, dir.path()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, html);
    }

    #[test]
    fn test_embed_images_keeps_unreadable_references() {
        let dir = tempdir().unwrap();
        let html = r#"<img src="missing.png">"#;
        let (out, count) = embed_images(html, dir.path()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, html);
    }

    #[test]
    fn test_to_data_uri_round_trip() {
        let dir = tempdir().unwrap();
        let path: PathBuf = dir.path().join("x.gif");
        fs::write(&path, b"GIF89a").unwrap();
        let uri = to_data_uri(&path).unwrap();
        assert!(uri.starts_with("data:image/gif;base64,"));
        let payload = uri.split(',').nth(1).unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"GIF89a");
    }
}
