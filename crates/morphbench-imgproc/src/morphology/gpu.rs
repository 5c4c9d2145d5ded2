use wgpu::util::DeviceExt;

use morphbench_image::{Image, ImageError, ImageSize};

use super::kernel::StructuringElement;

const DILATE_SHADER: &str = include_str!("dilate.wgsl");

const WORKGROUP_SIZE: u32 = 256;

/// Errors related to the GPU dilation backend.
#[derive(thiserror::Error, Debug)]
pub enum GpuError {
    /// No suitable GPU adapter was found.
    #[error("Failed to find a suitable GPU adapter. {0}")]
    AdapterNotFound(String),

    /// The GPU device could not be created.
    #[error("Failed to create the GPU device. {0}")]
    DeviceCreation(String),

    /// Waiting on the GPU queue failed.
    #[error("Failed to wait for the GPU queue. {0}")]
    Poll(String),

    /// Reading back a GPU buffer failed.
    #[error("Failed to read back the GPU buffer. {0}")]
    Readback(String),

    /// An underlying image error.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Parameters passed to the dilation shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    words_per_row: u32,
    se_width: u32,
    se_height: u32,
    anchor_x: u32,
    anchor_y: u32,
    _pad: u32,
}

/// Grayscale image data stored on the GPU.
///
/// Pixels are packed four per `u32` word, one row of words per image row.
#[derive(Debug)]
pub struct GpuImage {
    buffer: wgpu::Buffer,
    size: ImageSize,
    words_per_row: usize,
}

impl GpuImage {
    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }
}

/// GPU dilation backend.
///
/// Holds the wgpu device, queue and the compiled compute pipeline. The
/// upload, dispatch and download steps are exposed separately so callers
/// can time the kernel with and without transfer costs.
#[derive(Debug)]
pub struct GpuDilate {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuDilate {
    /// Create the GPU context and compile the dilation pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError`] if no adapter is available or the device
    /// cannot be created.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| GpuError::AdapterNotFound(e.to_string()))?;

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dilate_shader"),
            source: wgpu::ShaderSource::Wgsl(DILATE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dilate_bind_group_layout"),
            entries: &[
                // Params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Source image
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Structuring element mask
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Output image
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dilate_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("dilate_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
        })
    }

    /// Upload a grayscale image to the GPU.
    pub fn upload(&self, src: &Image<u8, 1>) -> GpuImage {
        let width = src.width();
        let height = src.height();
        let words_per_row = width.div_ceil(4);

        let mut words = vec![0u32; words_per_row * height];
        let data = src.as_slice();
        for y in 0..height {
            let row = &data[y * width..(y + 1) * width];
            let out = &mut words[y * words_per_row..(y + 1) * words_per_row];
            for (x, &val) in row.iter().enumerate() {
                out[x >> 2] |= (val as u32) << ((x & 3) * 8);
            }
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("dilate_src_buffer"),
                contents: bytemuck::cast_slice(&words),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });

        GpuImage {
            buffer,
            size: src.size(),
            words_per_row,
        }
    }

    /// Allocate an uninitialized GPU image of the given size.
    pub fn alloc_output(&self, size: ImageSize) -> GpuImage {
        let words_per_row = size.width.div_ceil(4);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dilate_dst_buffer"),
            size: (words_per_row * size.height * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        GpuImage {
            buffer,
            size,
            words_per_row,
        }
    }

    /// Run the dilation kernel and block until the GPU queue is idle.
    ///
    /// # Arguments
    ///
    /// * `src` - The uploaded source image.
    /// * `dst` - The output image allocated with [`GpuDilate::alloc_output`].
    /// * `se` - The morphological structuring element.
    pub fn dispatch(
        &self,
        src: &GpuImage,
        dst: &GpuImage,
        se: &StructuringElement,
    ) -> Result<(), GpuError> {
        if src.size != dst.size {
            return Err(GpuError::Image(ImageError::InvalidImageSize(
                src.size.width,
                src.size.height,
                dst.size.width,
                dst.size.height,
            )));
        }

        let (anchor_x, anchor_y) = se.anchor();
        let params = Params {
            width: src.size.width as u32,
            height: src.size.height as u32,
            words_per_row: src.words_per_row as u32,
            se_width: se.width() as u32,
            se_height: se.height() as u32,
            anchor_x: anchor_x as u32,
            anchor_y: anchor_y as u32,
            _pad: 0,
        };

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("dilate_params_buffer"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let mask_words = se.data().iter().map(|&v| v as u32).collect::<Vec<_>>();
        let mask_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("dilate_mask_buffer"),
                contents: bytemuck::cast_slice(&mask_words),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dilate_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: src.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: mask_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: dst.buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dilate_encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("dilate_pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);

            let work_items = (src.words_per_row * src.size.height) as u32;
            compute_pass.dispatch_workgroups(work_items.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| GpuError::Poll(e.to_string()))?;

        Ok(())
    }

    /// Download a GPU image back to the CPU.
    pub fn download(&self, src: &GpuImage) -> Result<Image<u8, 1>, GpuError> {
        let byte_size = (src.words_per_row * src.size.height * std::mem::size_of::<u32>()) as u64;

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dilate_staging_buffer"),
            size: byte_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dilate_download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&src.buffer, 0, &staging_buffer, 0, byte_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let words: &[u32] = bytemuck::cast_slice(&data);

        let width = src.size.width;
        let height = src.size.height;
        let mut pixels = vec![0u8; width * height];
        for y in 0..height {
            let row = &words[y * src.words_per_row..(y + 1) * src.words_per_row];
            let out = &mut pixels[y * width..(y + 1) * width];
            for (x, val) in out.iter_mut().enumerate() {
                *val = ((row[x >> 2] >> ((x & 3) * 8)) & 0xff) as u8;
            }
        }

        drop(data);
        staging_buffer.unmap();

        Ok(Image::new(src.size, pixels)?)
    }

    /// Dilate an image on the GPU in one call: upload, dispatch, download.
    pub fn dilate(
        &self,
        src: &Image<u8, 1>,
        dst: &mut Image<u8, 1>,
        se: &StructuringElement,
    ) -> Result<(), GpuError> {
        let src_gpu = self.upload(src);
        let dst_gpu = self.alloc_output(src.size());
        self.dispatch(&src_gpu, &dst_gpu, se)?;
        *dst = self.download(&dst_gpu)?;

        Ok(())
    }
}
