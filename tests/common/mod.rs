//! Shared fixtures for integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use pdf_paint::color::{PatternSpace, TintTransform};
use pdf_paint::graphics::{GroupParams, ImageParams, SoftMaskParams};
use pdf_paint::{ColorSpace, Device, Dict, Object, Result};

/// Something the device was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InstallSpace(String),
    BeginImage(String),
    EndImage,
    BeginGroup { isolated: bool },
    EndGroup,
    BeginMask { matte: Vec<f64> },
    EndMask,
    Form,
    ReleaseFunction,
    ReleasePattern,
}

/// Device that records every call and accepts a bounded number of bytes
/// per plane per call.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    /// Per-call limit for each plane; `None` accepts everything
    pub limit: Option<usize>,
    pub calls: Vec<Call>,
    pub images: Vec<ImageParams>,
    /// Bytes received per plane, concatenated across calls
    pub planes: Vec<Vec<u8>>,
    pub next_planes_calls: usize,
    /// Fail `begin_image` when set
    pub reject_images: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trickle(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn image_types(&self) -> Vec<&'static str> {
        self.images.iter().map(|p| p.image_type.name()).collect()
    }

    pub fn sample_bytes(&self) -> usize {
        self.planes.last().map_or(0, Vec::len)
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|c| *c == wanted).count()
    }

    pub fn open_groups(&self) -> i64 {
        self.calls.iter().fold(0, |depth, call| match call {
            Call::BeginGroup { .. } => depth + 1,
            Call::EndGroup => depth - 1,
            _ => depth,
        })
    }
}

impl Device for RecordingDevice {
    fn begin_image(&mut self, params: &ImageParams) -> Result<()> {
        if self.reject_images {
            return Err(pdf_paint::Error::LimitCheck("device refused image".to_string()));
        }
        self.calls.push(Call::BeginImage(params.image_type.name().to_string()));
        // Hold no colour-space references so release counts stay exact.
        self.images.push(ImageParams {
            color_space: None,
            ..params.clone()
        });
        self.planes = vec![Vec::new(); params.plane_count()];
        Ok(())
    }

    fn next_planes(&mut self, planes: &[&[u8]], used: &mut [usize]) -> Result<()> {
        self.next_planes_calls += 1;
        if self.planes.len() < planes.len() {
            self.planes.resize(planes.len(), Vec::new());
        }
        for (i, plane) in planes.iter().enumerate() {
            let n = self.limit.map_or(plane.len(), |l| l.min(plane.len()));
            self.planes[i].extend_from_slice(&plane[..n]);
            used[i] = n;
        }
        Ok(())
    }

    fn end_image(&mut self) -> Result<()> {
        self.calls.push(Call::EndImage);
        Ok(())
    }

    fn begin_transparency_group(&mut self, group: &GroupParams) -> Result<()> {
        self.calls.push(Call::BeginGroup {
            isolated: group.isolated,
        });
        Ok(())
    }

    fn end_transparency_group(&mut self) -> Result<()> {
        self.calls.push(Call::EndGroup);
        Ok(())
    }

    fn begin_transparency_mask(&mut self, mask: &SoftMaskParams) -> Result<()> {
        self.calls.push(Call::BeginMask {
            matte: mask.matte.clone(),
        });
        Ok(())
    }

    fn end_transparency_mask(&mut self) -> Result<()> {
        self.calls.push(Call::EndMask);
        Ok(())
    }

    fn install_color_space(&mut self, space: &ColorSpace) -> Result<()> {
        self.calls.push(Call::InstallSpace(space.family_name().to_string()));
        Ok(())
    }

    fn render_form(&mut self, _form: &Object) -> Result<()> {
        self.calls.push(Call::Form);
        Ok(())
    }

    fn release_tint_transform(&mut self, _transform: &TintTransform) {
        self.calls.push(Call::ReleaseFunction);
    }

    fn release_pattern(&mut self, _pattern: &PatternSpace) {
        self.calls.push(Call::ReleasePattern);
    }
}

/// Route `log` output through the test harness; `RUST_LOG=debug` to see it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn name(n: &str) -> Object {
    Object::name(n)
}

pub fn int(v: i64) -> Object {
    Object::Integer(v)
}

pub fn array(items: Vec<Object>) -> Object {
    Object::Array(items)
}

pub fn dict(entries: &[(&str, Object)]) -> Dict {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

pub fn stream(entries: &[(&str, Object)], data: impl Into<Bytes>) -> Object {
    Object::Stream {
        dict: dict(entries),
        data: data.into(),
    }
}

/// An image stream with the given geometry and uncompressed samples.
pub fn image(width: i64, height: i64, bpc: i64, space: Object, data: Vec<u8>) -> Object {
    stream(
        &[
            ("Type", name("XObject")),
            ("Subtype", name("Image")),
            ("Width", int(width)),
            ("Height", int(height)),
            ("BitsPerComponent", int(bpc)),
            ("ColorSpace", space),
        ],
        data,
    )
}

/// Same as [`image`] with extra dictionary entries.
pub fn image_with(width: i64, height: i64, bpc: i64, space: Object, data: Vec<u8>, extra: &[(&str, Object)]) -> Object {
    let Object::Stream { mut dict, data } = image(width, height, bpc, space, data) else {
        unreachable!()
    };
    for (k, v) in extra {
        dict.insert(k.to_string(), v.clone());
    }
    Object::Stream { dict, data }
}

/// A Separation space with an empty Type 2 function.
pub fn separation(colorant: &str, alternate: &str) -> Object {
    array(vec![
        name("Separation"),
        name(colorant),
        name(alternate),
        Object::Dictionary(dict(&[("FunctionType", int(2))])),
    ])
}

/// A JP2 box.
pub fn jp2_box(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out
}

/// A JP2 file header: signature, ftyp and a jp2h holding ihdr and `extra`.
pub fn jp2_file(components: u16, bpc_byte: u8, extra: &[Vec<u8>]) -> Vec<u8> {
    let mut ihdr = vec![0u8; 14];
    ihdr[8..10].copy_from_slice(&components.to_be_bytes());
    ihdr[10] = bpc_byte;
    let mut header = jp2_box(b"ihdr", &ihdr);
    for b in extra {
        header.extend_from_slice(b);
    }
    let mut file = jp2_box(b"jP  ", &[0x0d, 0x0a, 0x87, 0x0a]);
    file.extend(jp2_box(b"ftyp", b"jp2 \0\0\0\0jp2 "));
    file.extend(jp2_box(b"jp2h", &header));
    file
}

/// An 8x8 baseline four-component JPEG whose every coefficient is zero.
///
/// No Adobe marker is written, so decoders read it as plain CMYK.
pub fn cmyk_jpeg() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    // Quantization table 0, all ones.
    out.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    out.extend_from_slice(&[1u8; 64]);
    // Frame: 8-bit, 8x8, four components sampled 1x1 on table 0.
    out.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x08, 0x00, 0x08, 0x04]);
    for id in 1..=4u8 {
        out.extend_from_slice(&[id, 0x11, 0x00]);
    }
    // One-code DC and AC tables: symbol 0 (zero diff, end of block) coded as `0`.
    for class in [0x00u8, 0x10] {
        out.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x14, class, 1]);
        out.extend_from_slice(&[0u8; 15]);
        out.push(0x00);
    }
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x0E, 0x04]);
    for id in 1..=4u8 {
        out.extend_from_slice(&[id, 0x00]);
    }
    out.extend_from_slice(&[0x00, 0x3F, 0x00]);
    // Four blocks of two bits each.
    out.push(0x00);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}
