//! Minimal synthetic headers for every supported format.
//!
//! Each builder emits only the bytes its decoder needs, so any shorter
//! prefix is a truncated file.

#![allow(dead_code)]

use pixdim::{ImageFormat, ImageSize};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const JXL_CONTAINER_PROLOGUE: [u8; 32] = [
    0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A, //
    0x00, 0x00, 0x00, 0x14, b'f', b't', b'y', b'p', b'j', b'x', b'l', b' ', //
    0x00, 0x00, 0x00, 0x00, b'j', b'x', b'l', b' ',
];

pub struct Fixture {
    pub name: &'static str,
    pub format: ImageFormat,
    pub data: Vec<u8>,
    pub size: ImageSize,
    /// Bytes the decoder needs; every shorter prefix must fail as truncated.
    pub needed: usize,
    /// Index of the first byte of the format's signature.
    pub signature_at: usize,
    /// Prefix lengths ending exactly on a top-level box boundary. Such a
    /// prefix is a well-formed container that simply lacks the box sought.
    pub missing_at: Vec<usize>,
}

pub fn bmp(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"BM");
    data.extend_from_slice(&(54 + width * height * 3).to_le_bytes());
    data.extend_from_slice(&[0u8; 4]);
    data.extend_from_slice(&54u32.to_le_bytes());
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data
}

pub fn bmp_core(sig: &[u8; 2], width: u16, height: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(sig);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&12u32.to_le_bytes());
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&24u16.to_le_bytes());
    data
}

/// Signature and the full logical screen descriptor.
pub fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut data = b"GIF89a".to_vec();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&[0xF7, 0x00, 0x00]);
    data
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data
}

pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0xAB, 0xCD]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data
}

/// Packs `(value, width)` fields least significant bit first.
pub fn pack_bits(fields: &[(u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    for &(value, width) in fields {
        for i in 0..width {
            if pos / 8 == out.len() {
                out.push(0);
            }
            if (value >> i) & 1 == 1 {
                out[pos / 8] |= 1 << (pos % 8);
            }
            pos += 1;
        }
    }
    out
}

/// Codestream signature plus a SizeHeader using 30-bit fields for both
/// dimensions: exactly 11 bytes.
pub fn jxl_codestream(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0xFF, 0x0A];
    data.extend(pack_bits(&[
        (0, 1),
        (3, 2),
        (height - 1, 30),
        (0, 3),
        (3, 2),
        (width - 1, 30),
    ]));
    data
}

pub fn iso_box(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out
}

pub fn jxl_container(width: u32, height: u32) -> Vec<u8> {
    let mut data = JXL_CONTAINER_PROLOGUE.to_vec();
    data.extend(iso_box(b"jxll", &[5]));
    data.extend(iso_box(b"jxlc", &jxl_codestream(width, height)));
    data
}

pub fn jxl_partial(width: u32, height: u32) -> Vec<u8> {
    let mut data = JXL_CONTAINER_PROLOGUE.to_vec();
    let mut first = 0u32.to_be_bytes().to_vec();
    first.extend(jxl_codestream(width, height));
    let mut last = 0x8000_0001u32.to_be_bytes().to_vec();
    last.extend_from_slice(&[0u8; 4]);
    data.extend(iso_box(b"jxlp", &last));
    data.extend(iso_box(b"jxlp", &first));
    data
}

pub fn ispe(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 4];
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    iso_box(b"ispe", &payload)
}

pub fn irot(angle: u8) -> Vec<u8> {
    iso_box(b"irot", &[angle])
}

/// `ftyp` then `meta` holding `iprp`/`ipco` with the given properties.
pub fn heif(properties: &[Vec<u8>]) -> Vec<u8> {
    let mut data = iso_box(b"ftyp", b"heic\0\0\0\0");
    let ipco = iso_box(b"ipco", &properties.concat());
    let iprp = iso_box(b"iprp", &ipco);
    let mut meta = vec![0u8; 4];
    meta.extend(iprp);
    data.extend(iso_box(b"meta", &meta));
    data
}

pub fn heif_single(width: u32, height: u32) -> Vec<u8> {
    heif(&[ispe(width, height)])
}

fn tiff_entry(le: bool, tag: u16, typ: u16, value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let put16 = |out: &mut Vec<u8>, v: u16| {
        out.extend_from_slice(&if le { v.to_le_bytes() } else { v.to_be_bytes() })
    };
    put16(&mut out, tag);
    put16(&mut out, typ);
    out.extend_from_slice(&if le { 1u32.to_le_bytes() } else { 1u32.to_be_bytes() });
    if typ == 3 {
        put16(&mut out, value as u16);
        out.extend_from_slice(&[0, 0]);
    } else {
        out.extend_from_slice(&if le { value.to_le_bytes() } else { value.to_be_bytes() });
    }
    out
}

/// Header plus one IFD with ImageWidth (LONG) and ImageLength (SHORT).
pub fn tiff(le: bool, width: u32, height: u16, width_first: bool) -> Vec<u8> {
    let mut data = if le {
        vec![b'I', b'I', 0x2A, 0x00, 8, 0, 0, 0]
    } else {
        vec![b'M', b'M', 0x00, 0x2A, 0, 0, 0, 8]
    };
    data.extend_from_slice(&if le { 2u16.to_le_bytes() } else { 2u16.to_be_bytes() });
    let w = tiff_entry(le, 256, 4, width);
    let h = tiff_entry(le, 257, 3, u32::from(height));
    if width_first {
        data.extend(w);
        data.extend(h);
    } else {
        data.extend(h);
        data.extend(w);
    }
    data
}

pub fn tiff_entries(le: bool, ifds: &[Vec<(u16, u16, u32)>]) -> Vec<u8> {
    let put32 = |v: u32| if le { v.to_le_bytes() } else { v.to_be_bytes() };
    let mut data = if le { b"II*\0".to_vec() } else { b"MM\0*".to_vec() };
    data.extend_from_slice(&put32(8));
    for (i, entries) in ifds.iter().enumerate() {
        let count = entries.len() as u16;
        data.extend_from_slice(&if le { count.to_le_bytes() } else { count.to_be_bytes() });
        for &(tag, typ, value) in entries {
            data.extend(tiff_entry(le, tag, typ, value));
        }
        let next = if i + 1 == ifds.len() {
            0
        } else {
            // keep the next IFD 4-byte aligned
            let end = data.len() + 4;
            let aligned = (end + 3) & !3;
            aligned as u32
        };
        data.extend_from_slice(&put32(next));
        while next != 0 && data.len() < next as usize {
            data.push(0);
        }
    }
    data
}

fn webp(chunk: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&((payload.len() + 12) as u32).to_le_bytes());
    data.extend_from_slice(b"WEBP");
    data.extend_from_slice(chunk);
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(payload);
    data
}

pub fn webp_vp8x(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 4];
    payload.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    webp(b"VP8X", &payload)
}

pub fn webp_vp8(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![0x10, 0x02, 0x00, 0x9D, 0x01, 0x2A];
    // top two bits are horizontal/vertical scale, not size
    payload.extend_from_slice(&(width | 0x4000).to_le_bytes());
    payload.extend_from_slice(&(height | 0x8000).to_le_bytes());
    webp(b"VP8 ", &payload)
}

pub fn webp_vp8l(width: u32, height: u32) -> Vec<u8> {
    let bits = (width - 1) | ((height - 1) << 14) | (1 << 28);
    let mut payload = vec![0x2F];
    payload.extend_from_slice(&bits.to_le_bytes());
    webp(b"VP8L", &payload)
}

fn fixture(
    name: &'static str,
    format: ImageFormat,
    data: Vec<u8>,
    size: ImageSize,
    signature_at: usize,
) -> Fixture {
    let needed = data.len();
    Fixture {
        name,
        format,
        data,
        size,
        needed,
        signature_at,
        missing_at: Vec::new(),
    }
}

/// One canonical fixture per format variant.
pub fn all() -> Vec<Fixture> {
    let mut gif = fixture("gif", ImageFormat::Gif, gif(320, 200), ImageSize::new(320, 200), 0);
    gif.needed = 10;

    // a bare codestream header is shorter than the sniffing window
    let mut codestream = jxl_codestream(1920, 1080);
    codestream.push(0);
    let mut jxl = fixture(
        "jxl",
        ImageFormat::JpegXl,
        codestream,
        ImageSize::new(1920, 1080),
        0,
    );
    jxl.needed = 11;

    let mut jxl_boxed = fixture(
        "jxl-container",
        ImageFormat::JpegXl,
        jxl_container(500, 333),
        ImageSize::new(500, 333),
        4,
    );
    jxl_boxed.missing_at = vec![32, 41];

    let mut heif = fixture(
        "heif",
        ImageFormat::Isobmff,
        heif_single(4032, 3024),
        ImageSize::new(4032, 3024),
        4,
    );
    heif.missing_at = vec![16];

    vec![
        fixture("bmp", ImageFormat::Bmp, bmp(800, 600), ImageSize::new(800, 600), 0),
        fixture(
            "bmp-os2",
            ImageFormat::Bmp,
            bmp_core(b"BA", 64, 32),
            ImageSize::new(64, 32),
            0,
        ),
        gif,
        fixture("png", ImageFormat::Png, png(1024, 768), ImageSize::new(1024, 768), 0),
        fixture("jpeg", ImageFormat::Jpeg, jpeg(64, 48), ImageSize::new(64, 48), 0),
        jxl,
        jxl_boxed,
        heif,
        fixture(
            "tiff",
            ImageFormat::Tiff,
            tiff(true, 800, 600, true),
            ImageSize::new(800, 600),
            0,
        ),
        fixture(
            "tiff-be",
            ImageFormat::Tiff,
            tiff(false, 800, 600, false),
            ImageSize::new(800, 600),
            0,
        ),
        fixture(
            "webp-vp8x",
            ImageFormat::WebP,
            webp_vp8x(640, 480),
            ImageSize::new(640, 480),
            0,
        ),
        fixture(
            "webp-vp8",
            ImageFormat::WebP,
            webp_vp8(550, 368),
            ImageSize::new(550, 368),
            0,
        ),
        fixture(
            "webp-vp8l",
            ImageFormat::WebP,
            webp_vp8l(386, 395),
            ImageSize::new(386, 395),
            0,
        ),
    ]
}
