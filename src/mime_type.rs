/// Content types the response writer can label a body with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MimeType {
    #[default]
    TextPlain,
    TextHtml,
    TextCss,
    TextCsv,
    TextXml,
    TextJavascript,
    TextMarkdown,
    TextCalendar,
    ApplicationJson,
    ApplicationXml,
    ApplicationPdf,
    ApplicationZip,
    ApplicationGzip,
    ApplicationTar,
    ApplicationOctetStream,
    ApplicationWasm,
    ApplicationFormUrlEncoded,
    ApplicationRtf,
    ApplicationLdJson,
    MultipartFormData,
    ImagePng,
    ImageJpeg,
    ImageGif,
    ImageSvg,
    ImageWebp,
    ImageIcon,
    ImageBmp,
    AudioMpeg,
    AudioWav,
    AudioOgg,
    VideoMp4,
    VideoWebm,
    FontWoff,
    FontWoff2,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::TextPlain => "text/plain",
            MimeType::TextHtml => "text/html",
            MimeType::TextCss => "text/css",
            MimeType::TextCsv => "text/csv",
            MimeType::TextXml => "text/xml",
            MimeType::TextJavascript => "text/javascript",
            MimeType::TextMarkdown => "text/markdown",
            MimeType::TextCalendar => "text/calendar",
            MimeType::ApplicationJson => "application/json",
            MimeType::ApplicationXml => "application/xml",
            MimeType::ApplicationPdf => "application/pdf",
            MimeType::ApplicationZip => "application/zip",
            MimeType::ApplicationGzip => "application/gzip",
            MimeType::ApplicationTar => "application/x-tar",
            MimeType::ApplicationOctetStream => "application/octet-stream",
            MimeType::ApplicationWasm => "application/wasm",
            MimeType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            MimeType::ApplicationRtf => "application/rtf",
            MimeType::ApplicationLdJson => "application/ld+json",
            MimeType::MultipartFormData => "multipart/form-data",
            MimeType::ImagePng => "image/png",
            MimeType::ImageJpeg => "image/jpeg",
            MimeType::ImageGif => "image/gif",
            MimeType::ImageSvg => "image/svg+xml",
            MimeType::ImageWebp => "image/webp",
            MimeType::ImageIcon => "image/x-icon",
            MimeType::ImageBmp => "image/bmp",
            MimeType::AudioMpeg => "audio/mpeg",
            MimeType::AudioWav => "audio/wav",
            MimeType::AudioOgg => "audio/ogg",
            MimeType::VideoMp4 => "video/mp4",
            MimeType::VideoWebm => "video/webm",
            MimeType::FontWoff => "font/woff",
            MimeType::FontWoff2 => "font/woff2",
        }
    }

    fn from_extension(ext: &str) -> Option<MimeType> {
        let mime = match ext {
            "txt" | "text" => MimeType::TextPlain,
            "html" | "htm" => MimeType::TextHtml,
            "css" => MimeType::TextCss,
            "csv" => MimeType::TextCsv,
            "js" | "mjs" => MimeType::TextJavascript,
            "md" => MimeType::TextMarkdown,
            "ics" => MimeType::TextCalendar,
            "json" => MimeType::ApplicationJson,
            "xml" => MimeType::ApplicationXml,
            "pdf" => MimeType::ApplicationPdf,
            "zip" => MimeType::ApplicationZip,
            "gz" => MimeType::ApplicationGzip,
            "tar" => MimeType::ApplicationTar,
            "bin" => MimeType::ApplicationOctetStream,
            "wasm" => MimeType::ApplicationWasm,
            "rtf" => MimeType::ApplicationRtf,
            "jsonld" => MimeType::ApplicationLdJson,
            "png" => MimeType::ImagePng,
            "jpg" | "jpeg" => MimeType::ImageJpeg,
            "gif" => MimeType::ImageGif,
            "svg" => MimeType::ImageSvg,
            "webp" => MimeType::ImageWebp,
            "ico" => MimeType::ImageIcon,
            "bmp" => MimeType::ImageBmp,
            "mp3" => MimeType::AudioMpeg,
            "wav" => MimeType::AudioWav,
            "ogg" => MimeType::AudioOgg,
            "mp4" => MimeType::VideoMp4,
            "webm" => MimeType::VideoWebm,
            "woff" => MimeType::FontWoff,
            "woff2" => MimeType::FontWoff2,
            _ => return None,
        };
        Some(mime)
    }

    /// Resolves a file extension (`"json"`, `".html"`) or a full MIME string.
    /// Anything unrecognized is served as `text/plain`.
    pub fn lookup(name: &str) -> MimeType {
        let name = name.trim().to_ascii_lowercase();
        if let Some(ext) = name.strip_prefix('.') {
            return Self::from_extension(ext).unwrap_or_default();
        }
        if let Some(mime) = Self::from_extension(&name) {
            return mime;
        }

        // "text/html; charset=utf-8" 같은 파라미터는 무시한다.
        let essence = name.split(';').next().unwrap_or_default().trim();
        ALL.iter()
            .copied()
            .find(|mime| mime.as_str() == essence)
            .unwrap_or_default()
    }
}

const ALL: [MimeType; 34] = [
    MimeType::TextPlain,
    MimeType::TextHtml,
    MimeType::TextCss,
    MimeType::TextCsv,
    MimeType::TextXml,
    MimeType::TextJavascript,
    MimeType::TextMarkdown,
    MimeType::TextCalendar,
    MimeType::ApplicationJson,
    MimeType::ApplicationXml,
    MimeType::ApplicationPdf,
    MimeType::ApplicationZip,
    MimeType::ApplicationGzip,
    MimeType::ApplicationTar,
    MimeType::ApplicationOctetStream,
    MimeType::ApplicationWasm,
    MimeType::ApplicationFormUrlEncoded,
    MimeType::ApplicationRtf,
    MimeType::ApplicationLdJson,
    MimeType::MultipartFormData,
    MimeType::ImagePng,
    MimeType::ImageJpeg,
    MimeType::ImageGif,
    MimeType::ImageSvg,
    MimeType::ImageWebp,
    MimeType::ImageIcon,
    MimeType::ImageBmp,
    MimeType::AudioMpeg,
    MimeType::AudioWav,
    MimeType::AudioOgg,
    MimeType::VideoMp4,
    MimeType::VideoWebm,
    MimeType::FontWoff,
    MimeType::FontWoff2,
];
