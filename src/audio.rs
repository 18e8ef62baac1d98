//! WAV persistence for generated waveforms.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, TtsError};

/// Write mono f32 PCM (-1.0..=1.0) to `path` as a 16-bit PCM WAV at
/// `sample_rate` Hz.
pub fn write_pcm_as_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let mut file = BufWriter::new(File::create(path.as_ref())?);

    let bytes_per_sample = 2u32;
    let data_size = samples.len() as u32 * bytes_per_sample;

    file.write_all(b"RIFF")?;
    file.write_u32::<LittleEndian>(36 + data_size)?;
    file.write_all(b"WAVE")?;

    file.write_all(b"fmt ")?;
    file.write_u32::<LittleEndian>(16)?;
    file.write_u16::<LittleEndian>(1)?; // PCM
    file.write_u16::<LittleEndian>(1)?; // mono
    file.write_u32::<LittleEndian>(sample_rate)?;
    file.write_u32::<LittleEndian>(sample_rate * bytes_per_sample)?;
    file.write_u16::<LittleEndian>(bytes_per_sample as u16)?;
    file.write_u16::<LittleEndian>(16)?;

    file.write_all(b"data")?;
    file.write_u32::<LittleEndian>(data_size)?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        file.write_i16::<LittleEndian>(quantized)?;
    }
    file.flush()?;
    Ok(())
}

/// Read a mono 16-bit PCM WAV back into f32 samples plus its sample rate.
/// Only the minimal layout written by [`write_pcm_as_wav`] is supported.
pub fn read_pcm_from_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let mut file = BufReader::new(File::open(path.as_ref())?);

    let mut tag = [0u8; 4];
    file.read_exact(&mut tag)?;
    if tag != *b"RIFF" {
        return Err(TtsError::Resource("not a RIFF file".to_string()));
    }
    file.read_u32::<LittleEndian>()?;
    file.read_exact(&mut tag)?;
    if tag != *b"WAVE" {
        return Err(TtsError::Resource("not a WAVE file".to_string()));
    }

    file.read_exact(&mut tag)?;
    if tag != *b"fmt " {
        return Err(TtsError::Resource("missing fmt subchunk".to_string()));
    }
    let fmt_size = file.read_u32::<LittleEndian>()?;
    let audio_format = file.read_u16::<LittleEndian>()?;
    let channels = file.read_u16::<LittleEndian>()?;
    if audio_format != 1 || channels != 1 {
        return Err(TtsError::Resource(
            "only mono 16-bit PCM is supported".to_string(),
        ));
    }
    let sample_rate = file.read_u32::<LittleEndian>()?;
    file.read_u32::<LittleEndian>()?; // byte rate
    file.read_u16::<LittleEndian>()?; // block align
    let bits = file.read_u16::<LittleEndian>()?;
    if bits != 16 {
        return Err(TtsError::Resource(format!("unsupported bit depth {bits}")));
    }
    // Skip any fmt extension bytes.
    for _ in 16..fmt_size {
        file.read_u8()?;
    }

    file.read_exact(&mut tag)?;
    if tag != *b"data" {
        return Err(TtsError::Resource("missing data subchunk".to_string()));
    }
    let data_size = file.read_u32::<LittleEndian>()?;
    let mut samples = Vec::with_capacity(data_size as usize / 2);
    for _ in 0..data_size / 2 {
        samples.push(file.read_i16::<LittleEndian>()? as f32 / 32767.0);
    }
    Ok((samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_round_trip_preserves_length_and_rate() {
        let path = std::env::temp_dir().join(format!("bambara-tts-wav-{}.wav", std::process::id()));
        let samples: Vec<f32> = (0..480).map(|i| (i as f32 / 480.0).sin() * 0.5).collect();
        write_pcm_as_wav(&path, &samples, 16_000).unwrap();
        let (back, rate) = read_pcm_from_wav(&path).unwrap();
        assert_eq!(back.len(), samples.len());
        assert_eq!(rate, 16_000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn samples_are_clamped_before_quantization() {
        let path =
            std::env::temp_dir().join(format!("bambara-tts-clip-{}.wav", std::process::id()));
        write_pcm_as_wav(&path, &[2.0, -2.0], 16_000).unwrap();
        let (back, _) = read_pcm_from_wav(&path).unwrap();
        assert!((back[0] - 1.0).abs() < 1e-3);
        assert!((back[1] + 1.0).abs() < 1e-3);
        std::fs::remove_file(&path).ok();
    }
}
