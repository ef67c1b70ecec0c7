use bytes::Bytes;

/// A request body as returned by [`Connection::content`](crate::connection::Connection::content).
///
/// `text/*` bodies are decoded as UTF-8 (invalid sequences are replaced), every
/// other content type is handed back as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Binary(Bytes),
}

impl Content {
    pub(crate) fn decode(bytes: Bytes, is_text: bool) -> Self {
        if is_text {
            Content::Text(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            Content::Binary(bytes)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Content> for Bytes {
    fn from(content: Content) -> Self {
        match content {
            Content::Text(text) => Bytes::from(text),
            Content::Binary(bytes) => bytes,
        }
    }
}
