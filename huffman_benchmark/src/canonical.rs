use std::hint::black_box;

use canonical_huffman::{count_symbols, entropy, BitReader, Decoder, Encoder, Result, EOF};
use dyn_size_of::GetSize;

use crate::{compare_texts, Conf, Measure};

fn compress(encoder: &Encoder, text: &[u32]) -> Result<Vec<u8>> {
    let mut compressed = Vec::with_capacity(text.len());
    let mut writer = encoder.writer(&mut compressed);
    writer.write_all(text)?;
    writer.close()?;
    drop(writer);
    Ok(compressed)
}

fn decompress(decoder: &Decoder, compressed: &[u8]) -> Result<Vec<u32>> {
    decoder.read_all(&mut BitReader::new(compressed))
}

pub fn benchmark(conf: &Conf) -> Result<()> {
    let text = conf.text();
    let counts = count_symbols(text.iter());
    println!("Entropy [bits/symbol]: {:.3}", entropy(&counts));

    let encoder = Encoder::new(&counts)?;
    let codebook = encoder.codebook_bytes();
    let encoded_bits = encoder.encoded_bits(&counts);
    println!("Codebook size [bytes]: {}", codebook.len());
    println!("Encoded text size [bits/symbol]: {:.3}", encoded_bits as f64 / text.len().max(1) as f64);
    println!("Encoder size [bytes]: {}", encoder.size_bytes());

    let compressed = compress(&encoder, &text)?;

    if matches!(conf.measure, Measure::Encode | Measure::All) {
        conf.print_time("Encoder construction time", conf.measure(|| Encoder::new(&counts)));
        conf.print_speed("Encoding", conf.measure(|| compress(&encoder, &text)));
    }

    let decoder = Decoder::new(&codebook)?;
    println!("Decoder size [bytes]: {}", decoder.size_bytes());
    println!("Longest code [bits]: {}", decoder.max_len());

    if matches!(conf.measure, Measure::Decode | Measure::All) {
        conf.print_time("Decoder reconstruction time", conf.measure(|| Decoder::new(&codebook)));
        let mut failures = 0u64;
        conf.print_speed("Decoding", conf.measure(|| {
            let mut bits = BitReader::new(&compressed[..]);
            loop {
                match decoder.read_symbol(&mut bits) {
                    Ok(EOF) => break,
                    Ok(symbol) => { black_box(symbol); }
                    Err(_) => { failures += 1; break; }
                }
            }
        }));
        if failures != 0 { println!("FAIL: {} decoding passes ended with an error", failures); }
    }

    if conf.verify {
        print!("Verification... ");
        compare_texts(&text, &decompress(&decoder, &compressed)?);
    }
    Ok(())
}
