//! Integration tests for stream decoders.
//!
//! Covers the individual filters, filter chains named by stream
//! dictionaries (full and inline keys) and predictor handling.

mod common;

use bytes::Bytes;
use common::cmyk_jpeg;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_paint::decoders::{
    decode_stream_object, decode_with_dict, AsciiHexDecoder, DctDecoder, FlateDecoder, LzwDecoder, RunLengthDecoder,
    StreamDecoder,
};
use pdf_paint::{Dict, Error, Object, RenderOptions};
use std::io::Write;
use weezl::{encode::Encoder as LzwEncoder, BitOrder};

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

fn filters(names: &[&str]) -> Object {
    Object::Array(names.iter().map(|n| Object::name(n)).collect())
}

#[test]
fn test_flate_decoder_integration() {
    let original = b"This is a test of FlateDecode compression in a PDF stream.";
    let decoded = FlateDecoder.decode(&zlib(original)).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_ascii_hex_decoder_integration() {
    let test_cases = vec![
        (b"48656C6C6F20576F726C64".as_slice(), b"Hello World".as_slice()),
        (b"54 65 73 74>".as_slice(), b"Test".as_slice()),
        (b"41424".as_slice(), b"AB@".as_slice()),
    ];

    for (input, expected) in test_cases {
        let decoded = AsciiHexDecoder.decode(input).unwrap();
        assert_eq!(decoded, expected);
    }
}

#[test]
fn test_lzw_decoder_integration() {
    let original = b"ABABABABABABABAB";
    let compressed = LzwEncoder::with_tiff_size_switch(BitOrder::Msb, 8)
        .encode(original)
        .unwrap();
    assert_eq!(LzwDecoder.decode(&compressed).unwrap(), original);
}

#[test]
fn test_runlength_decoder_integration() {
    // Literal run of three bytes.
    assert_eq!(RunLengthDecoder.decode(&[2, b'A', b'B', b'C']).unwrap(), b"ABC");
    // 257 - 250 = 7 repeats.
    assert_eq!(RunLengthDecoder.decode(&[250, b'X']).unwrap(), b"XXXXXXX");
    // EOD stops decoding.
    assert_eq!(RunLengthDecoder.decode(&[0, b'Q', 128, 0, b'Z']).unwrap(), b"Q");
}

#[test]
fn test_runlength_truncated_literal() {
    assert!(matches!(RunLengthDecoder.decode(&[5, b'A']), Err(Error::Decode(_))));
}

#[test]
fn test_dct_decodes_to_samples() {
    let pixels = vec![0x80u8; 16 * 8];
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .encode(&pixels, 16, 8, image::ColorType::L8)
        .unwrap();

    let decoded = DctDecoder.decode(&jpeg).unwrap();
    assert_eq!(decoded.len(), 16 * 8);
}

#[test]
fn test_dct_keeps_four_cmyk_channels() {
    let decoded = DctDecoder.decode(&cmyk_jpeg()).unwrap();
    assert_eq!(decoded.len(), 8 * 8 * 4);
    assert!(decoded.iter().all(|&b| b == decoded[0]));
}

#[test]
fn test_dct_rejects_garbage() {
    assert!(matches!(DctDecoder.decode(b"\xFF\xD8 not a jpeg"), Err(Error::Decode(_))));
}

#[test]
fn test_filter_chain_from_dictionary() {
    let original = b"Hello, World!";
    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), filters(&["ASCIIHexDecode", "FlateDecode"]));

    let decoded = decode_with_dict(hex(&zlib(original)).as_bytes(), &dict, &RenderOptions::default()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_inline_filter_chain() {
    let original = b"Complex!";
    let lzw = LzwEncoder::with_tiff_size_switch(BitOrder::Msb, 8)
        .encode(original)
        .unwrap();
    let encoded = hex(&zlib(&lzw));

    let mut dict = Dict::new();
    dict.insert("F".to_string(), filters(&["AHx", "Fl", "LZW"]));
    let decoded = decode_with_dict(encoded.as_bytes(), &dict, &RenderOptions::default()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_png_up_predictor() {
    // Two rows of three bytes, each tagged with PNG filter 2 (Up).
    let filtered = [2, 1, 2, 3, 2, 1, 1, 1];
    let mut params = Dict::new();
    params.insert("Predictor".to_string(), Object::Integer(12));
    params.insert("Columns".to_string(), Object::Integer(3));

    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), Object::name("FlateDecode"));
    dict.insert("DecodeParms".to_string(), Object::Dictionary(params));

    let decoded = decode_with_dict(&zlib(&filtered), &dict, &RenderOptions::default()).unwrap();
    assert_eq!(decoded, vec![1, 2, 3, 2, 3, 4]);
}

#[test]
fn test_predictor_applies_to_its_own_filter() {
    let filtered = [2, 5, 5];
    let mut params = Dict::new();
    params.insert("Predictor".to_string(), Object::Integer(12));
    params.insert("Columns".to_string(), Object::Integer(2));

    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), filters(&["ASCIIHexDecode", "FlateDecode"]));
    dict.insert(
        "DecodeParms".to_string(),
        Object::Array(vec![Object::Null, Object::Dictionary(params)]),
    );

    let decoded = decode_with_dict(hex(&zlib(&filtered)).as_bytes(), &dict, &RenderOptions::default()).unwrap();
    assert_eq!(decoded, vec![5, 5]);
}

#[test]
fn test_unknown_filter_in_chain() {
    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), filters(&["ASCIIHexDecode", "NonExistentFilter"]));
    match decode_with_dict(b"41", &dict, &RenderOptions::default()) {
        Err(Error::UnsupportedFilter(name)) => assert_eq!(name, "NonExistentFilter"),
        other => panic!("expected UnsupportedFilter, got {:?}", other),
    }
}

#[test]
fn test_stream_object_with_flate() {
    let original = b"This is compressed data in a PDF stream.";
    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), Object::name("FlateDecode"));
    let stream = Object::Stream {
        dict,
        data: Bytes::from(zlib(original)),
    };
    assert_eq!(decode_stream_object(&stream, &RenderOptions::default()).unwrap(), original);
}

#[test]
fn test_stream_object_without_filter() {
    let stream = Object::Stream {
        dict: Dict::new(),
        data: Bytes::from_static(b"Hello, World!"),
    };
    assert_eq!(decode_stream_object(&stream, &RenderOptions::default()).unwrap(), b"Hello, World!");
}

#[test]
fn test_decompressed_size_limit() {
    let mut options = RenderOptions::default();
    options.max_decompressed_size = 64;
    let mut dict = Dict::new();
    dict.insert("Filter".to_string(), Object::name("FlateDecode"));
    let result = decode_with_dict(&zlib(&[0u8; 4096]), &dict, &options);
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn test_all_decoders_name() {
    assert_eq!(FlateDecoder.name(), "FlateDecode");
    assert_eq!(AsciiHexDecoder.name(), "ASCIIHexDecode");
    assert_eq!(LzwDecoder.name(), "LZWDecode");
    assert_eq!(RunLengthDecoder.name(), "RunLengthDecode");
    assert_eq!(DctDecoder.name(), "DCTDecode");
}
