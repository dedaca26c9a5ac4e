//! Native GeoTIFF reading/writing built on the `tiff` crate.
//!
//! Supported georeferencing: ModelPixelScale + ModelTiepoint (north-up
//! transform), the EPSG code from the GeoKeyDirectory, and the GDAL_NODATA
//! ASCII tag. Other GeoTIFF keys are ignored on read and not written.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::compression::{Compression as TiffCompression, Deflate, Lzw, Uncompressed};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Compression applied to written image data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Lzw,
    Deflate,
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    pub compression: Compression,
}

/// Read the first band of a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF held in memory
pub fn read_geotiff_from_buffer<T: RasterElement>(data: &[u8]) -> Result<Raster<T>> {
    decode_geotiff(Cursor::new(data))
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let (rows, cols) = (height as usize, width as usize);

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match image {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ));
        }
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_epsg(&mut decoder).map(CRS::from_epsg));
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok()?;
    GeoTransform::from_tiepoint_scale(&tiepoint, &scale)
}

/// EPSG code from the GeoKeyDirectory, projected key first.
fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let keys = decoder.get_tag_u16_vec(tag(GEO_KEY_DIRECTORY)).ok()?;
    let entries = keys.get(4..)?;
    let lookup = |wanted: u16| {
        entries
            .chunks_exact(4)
            // Only keys stored inline (location 0) carry the code directly.
            .find(|entry| entry[0] == wanted && entry[1] == 0)
            .map(|entry| u32::from(entry[3]))
    };
    lookup(PROJECTED_CS_TYPE_KEY).or_else(|| lookup(GEOGRAPHIC_TYPE_KEY))
}

fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: RasterElement,
    R: Read + Seek,
{
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    let value: f64 = text.trim_matches(|c: char| c == '\0' || c.is_whitespace()).parse().ok()?;
    num_traits::cast(value)
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(raster, &mut writer, options.unwrap_or_default())?;
    writer.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF
pub fn write_geotiff_to_buffer<T: RasterElement>(
    raster: &Raster<T>,
    options: Option<GeoTiffOptions>,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), options.unwrap_or_default())?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    match options.compression {
        Compression::None => encode_with(raster, writer, Uncompressed),
        Compression::Lzw => encode_with(raster, writer, Lzw::default()),
        Compression::Deflate => encode_with(raster, writer, Deflate::default()),
    }
}

fn geo_keys(crs: Option<&CRS>) -> Vec<u16> {
    let epsg = crs
        .map(|c| c.epsg())
        .and_then(|code| u16::try_from(code).ok());
    let geographic = crs.is_some_and(|c| c.is_geographic());

    let model_type = if geographic {
        MODEL_TYPE_GEOGRAPHIC
    } else {
        MODEL_TYPE_PROJECTED
    };
    let mut keys = vec![
        GT_MODEL_TYPE_KEY, 0, 1, model_type,
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
    ];
    if let Some(code) = epsg {
        let key = if geographic {
            GEOGRAPHIC_TYPE_KEY
        } else {
            PROJECTED_CS_TYPE_KEY
        };
        keys.extend_from_slice(&[key, 0, 1, code]);
    }

    let count = (keys.len() / 4) as u16;
    let mut directory = vec![1, 1, 0, count];
    directory.extend(keys);
    directory
}

fn encode_with<T, W, C>(raster: &Raster<T>, writer: W, compression: C) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
    C: TiffCompression,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image_with_compression::<Gray32Float, C>(cols as u32, rows as u32, compression)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();
    let scale = gt.pixel_scale();
    image
        .encoder()
        .write_tag(tag(MODEL_PIXEL_SCALE), &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = gt.tiepoint();
    image
        .encoder()
        .write_tag(tag(MODEL_TIEPOINT), &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let keys = geo_keys(raster.crs());
    image
        .encoder()
        .write_tag(tag(GEO_KEY_DIRECTORY), keys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if let Some(nodata) = raster.nodata().and_then(|v| v.to_f64()) {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(tag(GDAL_NODATA), text.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
