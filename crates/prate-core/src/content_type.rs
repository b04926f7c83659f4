//! Content types and MIME lookup.

use std::fmt;

use http::HeaderValue;

/// Common MIME type strings.
pub mod mime {
    /// `text/xml`
    pub const TEXT_XML: &str = "text/xml";
    /// `text/html`
    pub const TEXT_HTML: &str = "text/html";
    /// `text/plain`
    pub const TEXT_PLAIN: &str = "text/plain";
    /// `application/xml`
    pub const APPLICATION_XML: &str = "application/xml";
    /// `application/json`
    pub const APPLICATION_JSON: &str = "application/json";
    /// `application/javascript`
    pub const APPLICATION_JAVASCRIPT: &str = "application/javascript";
    /// `application/x-www-form-urlencoded`
    pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";
    /// `application/octet-stream`
    pub const OCTET_STREAM: &str = "application/octet-stream";
    /// `multipart/form-data`
    pub const MULTIPART_FORM: &str = "multipart/form-data";
    /// `application/vnd.google.protobuf`
    pub const APPLICATION_PROTOBUF: &str = "application/vnd.google.protobuf";

    /// `text/xml; charset=utf-8`
    pub const TEXT_XML_UTF8: &str = "text/xml; charset=utf-8";
    /// `text/html; charset=utf-8`
    pub const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";
    /// `text/plain; charset=utf-8`
    pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
    /// `application/xml; charset=utf-8`
    pub const APPLICATION_XML_UTF8: &str = "application/xml; charset=utf-8";
    /// `application/json; charset=utf-8`
    pub const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";
    /// `application/javascript; charset=utf-8`
    pub const APPLICATION_JAVASCRIPT_UTF8: &str = "application/javascript; charset=utf-8";
}

/// A response content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentType(&'static str);

impl ContentType {
    /// `application/json`
    pub const JSON: Self = Self(mime::APPLICATION_JSON);
    /// `application/vnd.google.protobuf`, used for every auto-encoded response.
    pub const PROTO: Self = Self(mime::APPLICATION_PROTOBUF);
    /// `text/html; charset=utf-8`
    pub const HTML: Self = Self(mime::TEXT_HTML_UTF8);
    /// `text/plain; charset=utf-8`
    pub const TEXT: Self = Self(mime::TEXT_PLAIN_UTF8);

    /// The header value text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// The value ready to be inserted into a header map.
    #[must_use]
    pub const fn header_value(&self) -> HeaderValue {
        HeaderValue::from_static(self.0)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<ContentType> for HeaderValue {
    fn from(ct: ContentType) -> Self {
        ct.header_value()
    }
}

/// Looks up the MIME type for a file extension.
///
/// Leading dots and spaces are ignored, so `"png"`, `".png"` and `" .png"`
/// are equivalent. Unknown extensions return `None`.
///
/// ```
/// use prate_core::content_type_from_extension;
///
/// assert_eq!(content_type_from_extension(".proto"), Some("application/vnd.google.protobuf"));
/// assert_eq!(content_type_from_extension("nope"), None);
/// ```
#[must_use]
pub fn content_type_from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches([' ', '.']);
    let mime = match ext {
        "html" | "htm" | "shtml" => mime::TEXT_HTML,
        "css" => "text/css",
        "gif" => "image/gif",
        "jpeg" | "jpg" => "image/jpeg",
        "xml" => mime::APPLICATION_XML,
        "js" => mime::APPLICATION_JAVASCRIPT,
        "atom" => "application/atom+xml",
        "rss" => "application/rss+xml",
        "mml" => "text/mathml",
        "txt" => mime::TEXT_PLAIN,
        "jad" => "text/vnd.sun.j2me.app-descriptor",
        "wml" => "text/vnd.wap.wml",
        "htc" => "text/x-component",
        "png" => "image/png",
        "svg" | "svgz" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "wbmp" => "image/vnd.wap.wbmp",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "jng" => "image/x-jng",
        "bmp" => "image/x-ms-bmp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "jar" | "war" | "ear" => "application/java-archive",
        "json" => mime::APPLICATION_JSON,
        "hqx" => "application/mac-binhex40",
        "doc" => "application/msword",
        "pdf" => "application/pdf",
        "ps" | "eps" | "ai" => "application/postscript",
        "rtf" => "application/rtf",
        "m3u8" => "application/vnd.apple.mpegurl",
        "kml" => "application/vnd.google-earth.kml+xml",
        "kmz" => "application/vnd.google-earth.kmz",
        "proto" => mime::APPLICATION_PROTOBUF,
        "xls" => "application/vnd.ms-excel",
        "eot" => "application/vnd.ms-fontobject",
        "ppt" => "application/vnd.ms-powerpoint",
        "odg" => "application/vnd.oasis.opendocument.graphics",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "wmlc" => "application/vnd.wap.wmlc",
        "7z" => "application/x-7z-compressed",
        "cco" => "application/x-cocoa",
        "jardiff" => "application/x-java-archive-diff",
        "jnlp" => "application/x-java-jnlp-file",
        "run" => "application/x-makeself",
        "pl" | "pm" => "application/x-perl",
        "prc" | "pdb" => "application/x-pilot",
        "rar" => "application/x-rar-compressed",
        "rpm" => "application/x-redhat-package-manager",
        "sea" => "application/x-sea",
        "swf" => "application/x-shockwave-flash",
        "sit" => "application/x-stuffit",
        "tcl" | "tk" => "application/x-tcl",
        "der" | "pem" | "crt" => "application/x-x509-ca-cert",
        "xpi" => "application/x-xpinstall",
        "xhtml" => "application/xhtml+xml",
        "xspf" => "application/xspf+xml",
        "zip" => "application/zip",
        "bin" | "exe" | "dll" | "deb" | "dmg" | "iso" | "img" | "msi" | "msp" | "msm" => {
            mime::OCTET_STREAM
        }
        "mid" | "midi" | "kar" => "audio/midi",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "m4a" => "audio/x-m4a",
        "ra" => "audio/x-realaudio",
        "3gpp" | "3gp" => "video/3gpp",
        "ts" => "video/mp2t",
        "mp4" => "video/mp4",
        "mpeg" | "mpg" => "video/mpeg",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "flv" => "video/x-flv",
        "m4v" => "video/x-m4v",
        "mng" => "video/x-mng",
        "asx" | "asf" => "video/x-ms-asf",
        "wmv" => "video/x-ms-wmv",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_strings() {
        assert_eq!(ContentType::JSON.as_str(), "application/json");
        assert_eq!(ContentType::PROTO.as_str(), "application/vnd.google.protobuf");
        assert_eq!(ContentType::HTML.to_string(), "text/html; charset=utf-8");
        assert_eq!(ContentType::TEXT.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_content_type_header_value() {
        let value: HeaderValue = ContentType::PROTO.into();
        assert_eq!(value, "application/vnd.google.protobuf");
    }

    #[test]
    fn test_extension_lookup_ignores_leading_dots_and_spaces() {
        assert_eq!(content_type_from_extension("png"), Some("image/png"));
        assert_eq!(content_type_from_extension(".png"), Some("image/png"));
        assert_eq!(content_type_from_extension(" ..png"), Some("image/png"));
    }

    #[test]
    fn test_extension_lookup_shared_types() {
        assert_eq!(content_type_from_extension("htm"), Some(mime::TEXT_HTML));
        assert_eq!(content_type_from_extension("dmg"), Some(mime::OCTET_STREAM));
        assert_eq!(content_type_from_extension("json"), Some(mime::APPLICATION_JSON));
    }

    #[test]
    fn test_extension_lookup_unknown() {
        assert_eq!(content_type_from_extension(""), None);
        assert_eq!(content_type_from_extension("PNG"), None);
        assert_eq!(content_type_from_extension("png "), None);
    }
}
