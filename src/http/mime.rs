//! Extension to `Content-Type` lookup.

use std::path::Path;

/// Returns the MIME type for `path`, or an empty string when the extension is
/// missing or not in the table.
pub fn content_type(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return "";
    };

    match extension.to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "gif" => "image/gif",
        "html" => "text/html",
        "js" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "swf" => "application/x-shockwave-flash",
        _ => "",
    }
}
