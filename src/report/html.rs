//! Self-contained HTML page around one inline SVG figure. No scripts, no
//! external resources.

use crate::error::Result;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render an SVG figure as an HTML page into `writer`.
pub fn render_html<W: Write>(writer: &mut W, svg: &str, title: &str) -> Result<()> {
    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; margin: 1em; }}
        figure {{ margin: 0; }}
        figure svg {{ max-width: 100%; height: auto; }}
    </style>
</head>
<body>
    <figure>
{svg}
    </figure>
    <!-- generated {generated} -->
</body>
</html>
"#,
        title = escape_html(title),
        svg = svg.trim(),
        generated = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    )?;
    Ok(())
}

/// Write the page for `svg` to `path`, creating parent directories.
pub fn write_html(svg: &str, title: &str, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    render_html(&mut writer, svg, title)?;
    writer.flush()?;
    log::info!("Wrote plot to {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::figure::statistics_boxplot_svg;
    use tempfile::TempDir;

    #[test]
    fn test_render_inlines_svg() {
        let svg = statistics_boxplot_svg(&[("pearson".to_string(), vec![0.5, 0.7])], "r").unwrap();
        let mut output = Vec::new();
        render_html(&mut output, &svg, "Scores <A> & B").unwrap();

        let html = String::from_utf8(output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Scores &lt;A&gt; &amp; B</title>"));
        assert!(html.contains(svg.trim()));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_page_needs_no_network() {
        let svg = statistics_boxplot_svg(&[("pearson".to_string(), vec![0.5, 0.7])], "r").unwrap();
        let mut output = Vec::new();
        render_html(&mut output, &svg, "offline").unwrap();

        let html = String::from_utf8(output).unwrap();
        assert!(!html.contains("<script"));
        assert!(!html.contains("src=\"http"));
        assert!(!html.contains("href=\"http"));
    }

    #[test]
    fn test_write_creates_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plots/nested/fig.html");
        let svg = statistics_boxplot_svg(&[], "y").unwrap();
        let written = write_html(&svg, "t", &path).unwrap();
        assert_eq!(written, path);
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("No data"));
        assert!(html.contains("</html>"));
    }
}
