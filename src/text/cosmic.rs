use super::{FontDescriptor, FontHandle, FontProvider, FontSlant};
use crate::style::Color;
use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, Metrics, Shaping, Style, SwashCache,
    Weight, Wrap,
};
use rustc_hash::FxHashMap;

const LINE_HEIGHT_SCALE: f32 = 1.25;

struct CosmicFont {
    descriptor: FontDescriptor,
    ref_count: u32,
}

/// [`FontProvider`] backed by cosmic-text shaping and swash rasterization.
pub struct CosmicFontProvider {
    font_system: FontSystem,
    swash_cache: SwashCache,
    fonts: FxHashMap<FontHandle, CosmicFont>,
    next_handle: u64,
}

impl CosmicFontProvider {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            fonts: FxHashMap::default(),
            next_handle: 1,
        }
    }

    fn shape(&mut self, font: FontHandle, text: &str) -> Option<Buffer> {
        let descriptor = self.fonts.get(&font)?.descriptor.clone();
        let size = descriptor.size.max(1.0);
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics::new(size, (size * LINE_HEIGHT_SCALE).max(1.0)),
        );
        buffer.set_wrap(&mut self.font_system, Wrap::None);
        buffer.set_size(&mut self.font_system, None, None);

        let family = match descriptor.family.as_str() {
            "" | "default" | "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        let style = match descriptor.slant {
            FontSlant::None => Style::Normal,
            FontSlant::Italic => Style::Italic,
            FontSlant::Oblique => Style::Oblique,
        };
        let attrs = Attrs::new()
            .family(family)
            .weight(Weight(descriptor.weight.to_css_weight()))
            .style(style);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        Some(buffer)
    }
}

impl Default for CosmicFontProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FontProvider for CosmicFontProvider {
    fn acquire_font(&mut self, descriptor: &FontDescriptor) -> Option<FontHandle> {
        if let Some((handle, font)) = self
            .fonts
            .iter_mut()
            .find(|(_, font)| &font.descriptor == descriptor)
        {
            font.ref_count += 1;
            return Some(*handle);
        }
        let handle = FontHandle(self.next_handle);
        self.next_handle += 1;
        self.fonts.insert(
            handle,
            CosmicFont {
                descriptor: descriptor.clone(),
                ref_count: 1,
            },
        );
        Some(handle)
    }

    fn release_font(&mut self, font: FontHandle) {
        let Some(entry) = self.fonts.get_mut(&font) else {
            return;
        };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            self.fonts.remove(&font);
        }
    }

    fn line_height(&self, font: FontHandle) -> f32 {
        self.fonts
            .get(&font)
            .map(|font| (font.descriptor.size.max(1.0) * LINE_HEIGHT_SCALE).ceil())
            .unwrap_or(0.0)
    }

    fn measure_string(&mut self, font: FontHandle, text: &str) -> f32 {
        let Some(buffer) = self.shape(font, text) else {
            return 0.0;
        };
        buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max)
    }

    fn rasterize_string(
        &mut self,
        font: FontHandle,
        text: &str,
        color: Color,
        width: u32,
        height: u32,
        buffer: &mut [u8],
    ) {
        let Some(shaped) = self.shape(font, text) else {
            return;
        };
        let text_color = CosmicColor::rgba(color.r, color.g, color.b, color.a);
        shaped.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            text_color,
            |x, y, w, h, pixel| {
                for py in y.max(0)..(y + h as i32).min(height as i32) {
                    for px in x.max(0)..(x + w as i32).min(width as i32) {
                        let index = ((py as u32 * width + px as u32) * 4) as usize;
                        if let Some(dst) = buffer.get_mut(index..index + 4) {
                            dst.copy_from_slice(&[pixel.r(), pixel.g(), pixel.b(), pixel.a()]);
                        }
                    }
                }
            },
        );
    }
}
