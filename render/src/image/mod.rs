//! Image rendering with graceful degradation: try the negotiated protocol,
//! then chafa, then in-process half-blocks. Only corrupt input or a fully
//! exhausted chain surface as errors.

mod chafa;
mod halfblock;
mod iterm2;
mod kitty;

pub use chafa::ChafaFormat;

use crate::error::RenderError;
use crate::protocol::ImageProtocol;
use image::ImageFormat;

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest {
    pub cols: u16,
    pub rows: u16,
    pub protocol: ImageProtocol,
    /// When false, a failing protocol step is an error instead of a hop to
    /// the next step.
    pub fallback_enabled: bool,
    /// Over SSH chafa is pinned to plain symbols.
    pub ssh: bool,
}

#[derive(Debug, Clone)]
pub struct Rendered {
    pub output: String,
    pub protocol_used: ImageProtocol,
}

impl Rendered {
    /// Whether the output is plain lines the layout engine can compose
    /// into a column, as opposed to a binary escape blob that must be
    /// emitted standalone.
    pub fn is_text_block(&self) -> bool {
        matches!(
            self.protocol_used,
            ImageProtocol::Chafa | ImageProtocol::Halfblock
        )
    }
}

/// Render `bytes` at the requested geometry. The bytes must decode as PNG,
/// JPEG, or GIF; anything else is `corrupt-image` and never enters the
/// chain.
pub async fn render(bytes: &[u8], request: &RenderRequest) -> Result<Rendered, RenderError> {
    let format = image::guess_format(bytes)
        .map_err(|err| RenderError::Decode(err.to_string()))?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif
    ) {
        return Err(RenderError::Decode(format!(
            "unsupported format {format:?}"
        )));
    }
    let decoded =
        image::load_from_memory(bytes).map_err(|err| RenderError::Decode(err.to_string()))?;

    let mut chain = vec![request.protocol];
    if request.fallback_enabled {
        for step in [ImageProtocol::Chafa, ImageProtocol::Halfblock] {
            if !chain.contains(&step) {
                chain.push(step);
            }
        }
    }

    let mut last_err = RenderError::Exhausted;
    for step in chain {
        let attempt = match step {
            ImageProtocol::Kitty => Ok(kitty::encode(bytes, request.cols, request.rows)),
            ImageProtocol::Iterm2 => Ok(iterm2::encode(bytes, request.cols, request.rows)),
            ImageProtocol::Sixel => {
                chafa::render(bytes, request.cols, request.rows, ChafaFormat::Sixels).await
            }
            ImageProtocol::Chafa => {
                let format = if request.ssh {
                    ChafaFormat::Symbols
                } else {
                    ChafaFormat::Auto
                };
                chafa::render(bytes, request.cols, request.rows, format).await
            }
            ImageProtocol::Halfblock => Ok(halfblock::render(&decoded, request.cols, request.rows)),
            ImageProtocol::None => Err(RenderError::Protocol {
                protocol: "none".to_string(),
                message: "image output disabled".to_string(),
            }),
        };
        match attempt {
            Ok(output) => {
                return Ok(Rendered {
                    output,
                    protocol_used: step,
                });
            }
            Err(err) => {
                tracing::debug!("{step} step failed: {err}");
                if !request.fallback_enabled {
                    return Err(err);
                }
                last_err = err;
            }
        }
    }
    tracing::warn!("image fallback chain exhausted: {last_err}");
    Err(RenderError::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use image::RgbaImage;
    use pretty_assertions::assert_eq;

    fn png_bytes() -> Vec<u8> {
        let mut img = RgbaImage::new(8, 8);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 30) as u8, 0, 128, 255]);
        }
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode");
        out.into_inner()
    }

    fn request(protocol: ImageProtocol) -> RenderRequest {
        RenderRequest {
            cols: 10,
            rows: 5,
            protocol,
            fallback_enabled: true,
            ssh: false,
        }
    }

    #[tokio::test]
    async fn corrupt_bytes_never_enter_the_chain() {
        let err = render(b"definitely not an image", &request(ImageProtocol::Halfblock))
            .await
            .expect_err("should fail");
        assert!(matches!(err, RenderError::Decode(_)));
    }

    #[tokio::test]
    async fn kitty_renders_without_fallback() {
        let rendered = render(&png_bytes(), &request(ImageProtocol::Kitty))
            .await
            .expect("render");
        assert_eq!(rendered.protocol_used, ImageProtocol::Kitty);
        assert!(!rendered.is_text_block());
        assert!(rendered.output.starts_with("\x1b_Gf=100,a=T,t=d,c=10,r=5,"));
    }

    #[tokio::test]
    async fn halfblock_is_a_text_block() {
        let rendered = render(&png_bytes(), &request(ImageProtocol::Halfblock))
            .await
            .expect("render");
        assert!(rendered.is_text_block());
        assert_eq!(rendered.output.lines().count(), 5);
    }

    #[tokio::test]
    async fn sixel_without_chafa_falls_back_to_halfblock() {
        if which::which("chafa").is_ok() {
            return;
        }
        let rendered = render(&png_bytes(), &request(ImageProtocol::Sixel))
            .await
            .expect("render");
        assert_eq!(rendered.protocol_used, ImageProtocol::Halfblock);
    }

    #[tokio::test]
    async fn fallback_disabled_surfaces_step_error() {
        if which::which("chafa").is_ok() {
            return;
        }
        let mut req = request(ImageProtocol::Chafa);
        req.fallback_enabled = false;
        let err = render(&png_bytes(), &req).await.expect_err("should fail");
        assert!(matches!(err, RenderError::Protocol { .. }));
    }
}
