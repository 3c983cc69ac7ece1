//! Texture conversion orchestration.
//!
//! Normalizes the input set for the configured processing mode, resolves
//! the pixel format, runs swizzle + per-tile encoding across the worker
//! pool, and compresses the concatenated tile stream.
//!
//! Tile jobs complete out of order; each carries a sequence number and the
//! collector drains them through a heap so the output stream keeps raster
//! order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::Write;
use std::sync::{Arc, Condvar, Mutex};

use image::{imageops, RgbaImage};
use tracing::debug;

use super::config::{ProcessingMode, TextureConfig};
use super::container;
use super::mipmap::MipmapGenerator;
use super::TextureError;
use crate::atlas::{pot_ceil, trim_image, Atlas, AtlasInput, SubImage};
use crate::compress;
use crate::encode::{self, PixelFormat, Tile};
use crate::pool::WorkerPool;
use crate::swizzle::swizzle;

/// One image to feed through the pipeline, with the prefix used to name
/// its preview output (cubemap faces carry `px_`, `nx_`, ...).
struct Face {
    prefix: &'static str,
    image: RgbaImage,
}

/// A converted texture ready to serialize.
#[derive(Debug)]
pub struct EncodedTexture {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mipmap_levels: u8,
    pub cubemap: bool,
    pub subimages: Vec<SubImage>,
    /// Compressed tile stream.
    pub payload: Vec<u8>,
    /// Preview images and their file-name prefixes, one per face.
    pub previews: Vec<(String, RgbaImage)>,
}

impl EncodedTexture {
    /// Serialize the container: header (unless `raw`) plus the compressed
    /// payload.
    pub fn to_bytes(&self, raw: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 64);
        if !raw {
            container::write_header(
                &mut out,
                self.width,
                self.height,
                self.format,
                self.mipmap_levels,
                self.cubemap,
                &self.subimages,
            );
        }
        out.extend_from_slice(&self.payload);
        out
    }

    /// Write the container to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W, raw: bool) -> Result<(), TextureError> {
        writer.write_all(&self.to_bytes(raw))?;
        Ok(())
    }
}

/// Result of one tile job. The ordering is inverted on `sequence` so a
/// max-heap surfaces the lowest sequence first.
struct WorkUnit {
    sequence: u64,
    data: Vec<u8>,
    preview: Option<Tile>,
    tx: u32,
    ty: u32,
}

impl PartialEq for WorkUnit {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for WorkUnit {}

impl PartialOrd for WorkUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorkUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        other.sequence.cmp(&self.sequence)
    }
}

type ResultQueue = Arc<(Mutex<BinaryHeap<WorkUnit>>, Condvar)>;

/// Texture encoder configured once and reusable across inputs.
pub struct Tex3dsEncoder {
    config: TextureConfig,
}

impl Tex3dsEncoder {
    pub fn new(config: TextureConfig) -> Self {
        Self { config }
    }

    /// Convert `inputs` according to the configured processing mode.
    pub fn encode(&self, inputs: Vec<AtlasInput>) -> Result<EncodedTexture, TextureError> {
        let mut subimages = Vec::new();

        let mut faces = match self.config.mode() {
            ProcessingMode::Atlas => {
                let atlas = Atlas::build(inputs, self.config.trim(), self.config.border())?;
                subimages = atlas.subimages;
                vec![Face {
                    prefix: "",
                    image: normalize(atlas.image, &mut subimages, true)?,
                }]
            }
            ProcessingMode::Normal => {
                let mut inputs = inputs;
                if inputs.len() != 1 {
                    return Err(TextureError::MultipleInputs);
                }
                let mut image = inputs.pop().expect("one input").image;
                if self.config.trim() {
                    image = trim_image(&image);
                }
                vec![Face {
                    prefix: "",
                    image: normalize(image, &mut subimages, false)?,
                }]
            }
            ProcessingMode::Cubemap | ProcessingMode::Skybox => {
                let mut inputs = inputs;
                if inputs.len() != 1 {
                    return Err(TextureError::MultipleInputs);
                }
                slice_faces(
                    inputs.pop().expect("one input").image,
                    self.config.mode() == ProcessingMode::Skybox,
                )?
            }
        };

        let cubemap = matches!(
            self.config.mode(),
            ProcessingMode::Cubemap | ProcessingMode::Skybox
        );

        let face_images: Vec<RgbaImage> = faces.iter().map(|f| f.image.clone()).collect();
        let format = self.config.format().resolve(&face_images);
        drop(face_images);

        let (width, height) = faces[0].image.dimensions();

        let mipmap_levels = if self.config.mipmap_filter().is_some() {
            width.ilog2().min(height.ilog2()) as u8 - 3
        } else {
            0
        };

        debug!(%format, width, height, mipmap_levels, "encoding texture");

        let pool = WorkerPool::new();
        let mut body = Vec::new();
        let mut previews = Vec::new();

        for face in &mut faces {
            let preview = self.process_face(&mut face.image, format, &pool, &mut body);
            if let Some(preview) = preview {
                previews.push((face.prefix.to_string(), preview));
            }
        }
        drop(pool);

        let payload = compress::compress(&body, self.config.compression());

        Ok(EncodedTexture {
            width,
            height,
            format,
            mipmap_levels,
            cubemap,
            subimages,
            payload,
            previews,
        })
    }

    /// Encode every mipmap level of one face, appending the tile stream
    /// to `body`. Returns the preview sheet when configured.
    fn process_face(
        &self,
        face: &mut RgbaImage,
        format: PixelFormat,
        pool: &WorkerPool,
        body: &mut Vec<u8>,
    ) -> Option<RgbaImage> {
        let (face_width, face_height) = face.dimensions();

        let chain = match self.config.mipmap_filter() {
            Some(filter) if face_width > 8 && face_height > 8 => {
                MipmapGenerator::generate_chain(face, filter)
            }
            _ => vec![face.clone()],
        };

        let mut preview = self.config.preview().then(|| {
            // Mipmaps go on the right third of the preview sheet.
            let sheet_width = if chain.len() > 1 {
                face_width * 3 / 2
            } else {
                face_width
            };
            RgbaImage::new(sheet_width, face_height)
        });

        let mut voff = 0i64;
        let mut hoff = 0i64;

        for mut level in chain {
            if !format.is_etc1() {
                swizzle(&mut level, false);
            }

            self.encode_level(&mut level, format, pool, body);

            if let Some(sheet) = preview.as_mut() {
                if !format.is_etc1() {
                    swizzle(&mut level, true);
                }

                let height = level.height() as i64;
                imageops::replace(sheet, &level, hoff, voff);

                voff += height;
                if hoff == 0 {
                    voff = 0;
                    hoff = level.width() as i64;
                }
            }
        }

        preview
    }

    /// Dispatch one level's tiles to the pool and collect the encoded
    /// bytes in raster order.
    fn encode_level(
        &self,
        level: &mut RgbaImage,
        format: PixelFormat,
        pool: &WorkerPool,
        body: &mut Vec<u8>,
    ) {
        let quality = self.config.etc1_quality();
        let want_preview = self.config.preview();

        let results: ResultQueue = Arc::new((Mutex::new(BinaryHeap::new()), Condvar::new()));

        let mut num_work = 0u64;
        for ty in (0..level.height()).step_by(8) {
            for tx in (0..level.width()).step_by(8) {
                let tile = Tile::from_image(level, tx, ty);
                let sequence = num_work;
                num_work += 1;

                let results = Arc::clone(&results);
                pool.execute(move || {
                    let mut data = Vec::with_capacity(format.bytes_per_tile());
                    encode::encode_tile(&tile, format, quality, &mut data);

                    let preview = want_preview.then(|| {
                        let mut tile = tile.clone();
                        encode::preview_tile(&mut tile, format, quality);
                        tile
                    });

                    let (queue, ready) = &*results;
                    queue
                        .lock()
                        .expect("result queue poisoned")
                        .push(WorkUnit {
                            sequence,
                            data,
                            preview,
                            tx,
                            ty,
                        });
                    ready.notify_one();
                });
            }
        }

        let (queue, ready) = &*results;
        for expected in 0..num_work {
            let mut heap = queue.lock().expect("result queue poisoned");
            while heap.peek().map(|unit| unit.sequence) != Some(expected) {
                heap = ready.wait(heap).expect("result queue poisoned");
            }
            let unit = heap.pop().expect("peeked unit");
            drop(heap);

            body.extend_from_slice(&unit.data);

            if let Some(tile) = unit.preview {
                tile.write_to_image(level, unit.tx, unit.ty);
            }
        }
    }
}

/// Expand an image to power-of-two dimensions, synthesizing the sub-image
/// record that addresses the original extent.
fn normalize(
    image: RgbaImage,
    subimages: &mut Vec<SubImage>,
    is_atlas: bool,
) -> Result<RgbaImage, TextureError> {
    let (width, height) = image.dimensions();

    if width > 1024 || height > 1024 || width == 0 || height == 0 {
        return Err(TextureError::InvalidDimension(width, height));
    }

    let pot_width = pot_ceil(width);
    let pot_height = pot_ceil(height);

    if width != pot_width || height != pot_height {
        let mut expanded = RgbaImage::new(pot_width, pot_height);
        imageops::replace(&mut expanded, &image, 0, 0);

        subimages.push(SubImage {
            index: 0,
            name: String::new(),
            left: 0.0,
            top: 1.0,
            right: width as f32 / pot_width as f32,
            bottom: 1.0 - height as f32 / pot_height as f32,
        });

        Ok(expanded)
    } else {
        if !is_atlas {
            subimages.push(SubImage {
                index: 0,
                name: String::new(),
                left: 0.0,
                top: 1.0,
                right: 1.0,
                bottom: 0.0,
            });
        }
        Ok(image)
    }
}

/// Slice a 4:3 cubemap/skybox sheet into its six faces.
///
/// The PICA 200 inverts the texture vertical axis, so every face is
/// flipped vertically; skybox side faces are additionally mirrored.
fn slice_faces(image: RgbaImage, skybox: bool) -> Result<Vec<Face>, TextureError> {
    let (sheet_width, sheet_height) = image.dimensions();

    if sheet_width % 4 != 0 || sheet_height % 3 != 0 {
        return Err(TextureError::InvalidDimension(sheet_width, sheet_height));
    }

    let width = sheet_width / 4;
    let height = sheet_height / 3;

    for dim in [width, height] {
        if !dim.is_power_of_two() || !(8..=1024).contains(&dim) {
            return Err(TextureError::InvalidDimension(sheet_width, sheet_height));
        }
    }

    let crop = |x: u32, y: u32| imageops::crop_imm(&image, x, y, width, height).to_image();

    let mut faces = Vec::with_capacity(6);

    // +x
    let mut face = crop(2 * width, height);
    if skybox {
        face = imageops::flip_horizontal(&face);
    }
    faces.push(Face {
        prefix: "px_",
        image: imageops::flip_vertical(&face),
    });

    // -x
    let mut face = crop(0, height);
    if skybox {
        face = imageops::flip_horizontal(&face);
    }
    faces.push(Face {
        prefix: "nx_",
        image: imageops::flip_vertical(&face),
    });

    // +y
    let mut face = crop(width, 0);
    if !skybox {
        face = imageops::flip_vertical(&face);
    }
    faces.push(Face {
        prefix: "py_",
        image: face,
    });

    // -y
    let mut face = crop(width, 2 * height);
    if !skybox {
        face = imageops::flip_vertical(&face);
    }
    faces.push(Face {
        prefix: "ny_",
        image: face,
    });

    // +z
    let face = if !skybox {
        crop(width, height)
    } else {
        imageops::flip_horizontal(&crop(3 * width, height))
    };
    faces.push(Face {
        prefix: "pz_",
        image: imageops::flip_vertical(&face),
    });

    // -z
    let face = if !skybox {
        crop(3 * width, height)
    } else {
        imageops::flip_horizontal(&crop(width, height))
    };
    faces.push(Face {
        prefix: "nz_",
        image: imageops::flip_vertical(&face),
    });

    Ok(faces)
}
