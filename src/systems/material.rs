use anyhow::Context;
use image::{ImageBuffer, Rgba};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

pub struct MaterialSystem {}

impl MaterialSystem {
    pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
        let image = image::load_from_memory(bytes).context("Failed to load image from memory")?;
        Ok(image.to_rgba8())
    }

    pub fn solid_color(color: [u8; 4]) -> RgbaImage {
        ImageBuffer::from_pixel(1, 1, Rgba(color))
    }

    /// Stand-in for the galaxy texture: black sky with scattered stars of
    /// random brightness. Seeded so every run draws the same sky.
    pub fn starfield(width: u32, height: u32, density: f32, seed: u64) -> RgbaImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut image = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 8, 255]));

        let stars = (width as f32 * height as f32 * density) as u32;
        for _ in 0..stars {
            let x = rng.gen_range(0..width);
            let y = rng.gen_range(0..height);
            let brightness: u8 = rng.gen_range(90..=255);
            // a faint blue tint on the dimmer ones
            let blue = brightness.saturating_add(20);
            image.put_pixel(x, y, Rgba([brightness, brightness, blue, 255]));
        }

        image
    }

    pub fn create_2d_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image_data: RgbaImage,
        label: &str,
    ) -> (wgpu::BindGroup, wgpu::BindGroupLayout) {
        let dimensions = image_data.dimensions();
        let texture_size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1, // Single layer for 2D texture
        };

        let texture_label = format!("{label} Texture");
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            label: Some(&texture_label),
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image_data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(dimensions.0 * 4), // 4 bytes per pixel for RGBA
                rows_per_image: Some(dimensions.1),
            },
            texture_size,
        );

        let view_label = format!("{label} Texture View");
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&view_label),
            dimension: Some(wgpu::TextureViewDimension::D2),
            format: Some(wgpu::TextureFormat::Rgba8UnormSrgb),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: 0,
            array_layer_count: None,
        });

        let sampler_label = format!("{label} Texture Sampler");
        let texture_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&sampler_label),
            // wrap horizontally so the seam of an equirectangular map filters cleanly
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout_label = format!("{label} Texture bind group layout");
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&layout_label),
                entries: &[
                    // Texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    // Sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        // This should match the filterable field of the
                        // corresponding Texture entry above.
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let bind_group_label = format!("{label} Texture bind group");
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture_sampler),
                },
            ],
            label: Some(&bind_group_label),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_do_not_decode() {
        assert!(MaterialSystem::decode_image(b"definitely not a png").is_err());
    }

    #[test]
    fn solid_color_is_a_single_pixel() {
        let image = MaterialSystem::solid_color([10, 20, 30, 255]);
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(image.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn starfield_is_deterministic_and_sparse() {
        let a = MaterialSystem::starfield(128, 64, 0.01, 7);
        let b = MaterialSystem::starfield(128, 64, 0.01, 7);
        assert_eq!(a, b);

        let lit = a.pixels().filter(|p| p.0[0] > 0).count();
        assert!(lit > 0);
        assert!(lit <= (128.0 * 64.0 * 0.01) as usize);
    }

    #[test]
    fn encoded_png_round_trips_through_decode() {
        let source = MaterialSystem::starfield(8, 8, 0.2, 1);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(source.clone())
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .expect("png encodes");
        let decoded = MaterialSystem::decode_image(&bytes).expect("png decodes");
        assert_eq!(decoded, source);
    }
}
