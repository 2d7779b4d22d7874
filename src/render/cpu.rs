use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas, Point, Rgba8Premul};
use crate::foundation::error::{MixdeckError, MixdeckResult};
use crate::layer::model::Geometry;
use crate::render::target::PaintTarget;
use crate::source::SourceFrame;

/// A rendered RGBA8 frame in row-major order.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel bytes in RGBA8 layout.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as `[r, g, b, a]`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy with color channels divided back out of alpha, for encoders that want straight RGBA.
    pub fn to_straight(&self) -> FrameRGBA {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let a = px[3];
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
                }
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// Options for [`CpuSurface`].
#[derive(Clone, Debug, Default)]
pub struct CpuSurfaceOpts {
    /// TrueType/OpenType bytes used for text and timer layers. Without a font, text is skipped.
    pub font_bytes: Option<Arc<Vec<u8>>>,
}

impl CpuSurfaceOpts {
    /// Use `bytes` as the text font.
    pub fn with_font_bytes(mut self, bytes: impl Into<Arc<Vec<u8>>>) -> Self {
        self.font_bytes = Some(bytes.into());
        self
    }

    /// Read the text font from `path`.
    pub fn with_font_path(self, path: impl AsRef<std::path::Path>) -> MixdeckResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            MixdeckError::config(format!("read font '{}': {e}", path.display()))
        })?;
        Ok(self.with_font_bytes(bytes))
    }
}

/// [`PaintTarget`] that rasterizes into an RGBA8 pixmap with `vello_cpu`.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: Option<TextShaper>,
    warned_no_font: bool,
    // One entry per `push_opacity`: whether a vello layer was actually pushed.
    opacity_stack: Vec<bool>,
    image_cache: Vec<CachedImage>,
}

struct CachedImage {
    frame: SourceFrame,
    paint: vello_cpu::Image,
    used: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("has_font", &self.text.is_some())
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Create a surface sized for `canvas`.
    pub fn new(canvas: Canvas, opts: CpuSurfaceOpts) -> MixdeckResult<Self> {
        let (width, height) = surface_dims(canvas)?;
        let text = opts
            .font_bytes
            .as_deref()
            .map(|bytes| TextShaper::new(bytes))
            .transpose()?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            text,
            warned_no_font: false,
            opacity_stack: Vec::new(),
            image_cache: Vec::new(),
        })
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// Whether text and timer layers can be drawn.
    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    /// Premultiplied RGBA8 bytes of the last finished frame.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy out the last finished frame.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn image_paint_for(&mut self, frame: &SourceFrame) -> MixdeckResult<vello_cpu::Image> {
        if let Some(hit) = self
            .image_cache
            .iter_mut()
            .find(|c| c.frame.same_buffer(frame))
        {
            hit.used = true;
            return Ok(hit.paint.clone());
        }

        let pixmap = premul_bytes_to_pixmap(frame.rgba8_premul(), frame.width(), frame.height())?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.push(CachedImage {
            frame: frame.clone(),
            paint: paint.clone(),
            used: true,
        });
        Ok(paint)
    }
}

impl PaintTarget for CpuSurface {
    fn begin_frame(&mut self, canvas: Canvas, clear: Rgba8Premul) -> MixdeckResult<()> {
        let (width, height) = surface_dims(canvas)?;
        if width != self.width || height != self.height {
            tracing::debug!(width, height, "resizing cpu surface");
            self.width = width;
            self.height = height;
            self.ctx = vello_cpu::RenderContext::new(width, height);
            self.pixmap = vello_cpu::Pixmap::new(width, height);
            self.image_cache.clear();
        } else {
            self.ctx.reset();
        }
        self.opacity_stack.clear();
        for c in &mut self.image_cache {
            c.used = false;
        }

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(clear));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        Ok(())
    }

    fn push_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let pushed = opacity < 1.0;
        if pushed {
            self.ctx.push_opacity_layer(opacity);
        }
        self.opacity_stack.push(pushed);
    }

    fn pop_opacity(&mut self) {
        if self.opacity_stack.pop() == Some(true) {
            self.ctx.pop_layer();
        }
    }

    fn draw_frame(&mut self, frame: &SourceFrame, dest: Geometry) -> MixdeckResult<()> {
        if dest.w <= 0.0 || dest.h <= 0.0 {
            return Ok(());
        }
        let paint = self.image_paint_for(frame)?;
        let (fw, fh) = (f64::from(frame.width()), f64::from(frame.height()));
        let transform = Affine::translate((dest.x, dest.y))
            * Affine::scale_non_uniform(dest.w / fw, dest.h / fh);

        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw, fh));
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8Premul,
    ) -> MixdeckResult<()> {
        let Some(shaper) = self.text.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font configured; text and timer layers are not drawn");
                self.warned_no_font = true;
            }
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let layout = shaper.layout(text, size_px)?;
        let origin = Point::new(
            anchor.x - f64::from(layout.width()) / 2.0,
            anchor.y - f64::from(layout.height()) / 2.0,
        );

        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&shaper.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Geometry, color: Rgba8Premul) -> MixdeckResult<()> {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x,
            rect.y,
            rect.x + rect.w,
            rect.y + rect.h,
        ));
        Ok(())
    }

    fn end_frame(&mut self) -> MixdeckResult<()> {
        while let Some(pushed) = self.opacity_stack.pop() {
            if pushed {
                self.ctx.pop_layer();
            }
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.image_cache.retain(|c| c.used);
        Ok(())
    }
}

/// Parley shaping for a single registered font family.
struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextShaper {
    fn new(font_bytes: &[u8]) -> MixdeckResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MixdeckError::config("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MixdeckError::config("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %family_name, "registered text font");

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                0,
            ),
        })
    }

    fn layout(&mut self, text: &str, size_px: f32) -> MixdeckResult<parley::Layout<()>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MixdeckError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

fn surface_dims(canvas: Canvas) -> MixdeckResult<(u16, u16)> {
    let width: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MixdeckError::render("canvas width exceeds u16"))?;
    let height: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MixdeckError::render("canvas height exceeds u16"))?;
    if width == 0 || height == 0 {
        return Err(MixdeckError::render("canvas must be non-empty"));
    }
    Ok((width, height))
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let unpremul = |v: u8| -> u8 {
        if c.a == 0 {
            0
        } else {
            ((u16::from(v) * 255 + u16::from(c.a) / 2) / u16::from(c.a)).min(255) as u8
        }
    };
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> MixdeckResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MixdeckError::render("source frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MixdeckError::render("source frame height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(MixdeckError::render("source frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
