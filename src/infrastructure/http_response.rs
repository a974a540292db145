// HTTP response utilities for SVG documents with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use tokio::io::AsyncReadExt;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Build an SVG response, Brotli-compressed when the client accepts it
pub async fn svg_response(svg: String, compress: bool) -> Result<Response<Body>, StatusCode> {
    let svg_bytes = svg.into_bytes();

    let (body_bytes, content_encoding) = if compress {
        let compressed = brotli(&svg_bytes).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!(
            "Compressed SVG: {} -> {} bytes",
            svg_bytes.len(),
            compressed.len()
        );
        (compressed, Some("br"))
    } else {
        (svg_bytes, None)
    };

    let content_length = HeaderValue::from(body_bytes.len());
    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, SVG_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONTENT_LENGTH, content_length);

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn brotli(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let cursor = std::io::Cursor::new(bytes);
    let mut encoder = BrotliEncoder::new(cursor);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Whether an `Accept-Encoding` header value allows Brotli
pub fn accepts_brotli(accept_encoding: Option<&str>) -> bool {
    accept_encoding
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}
