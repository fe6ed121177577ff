#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate fastq_signature;

use fastq_signature::scan::scan_fastq;

fuzz_target!(|data: &[u8]| {
    let state = scan_fastq(data, None);
    // every barcode-less signature is the projection of a full one
    assert!(state.signatures_no_barcode.len() <= state.signatures.len());

    // every counted barcode belongs to a published lane signature
    let mut barcode_reads = 0;
    for (lane, barcodes) in &state.barcode_counts {
        for (barcode, n) in barcodes {
            assert!(state.signatures.contains(&lane.signature(barcode)));
            barcode_reads += n;
        }
    }
    // a trailing header may lack its sequence line
    assert!(barcode_reads <= state.read_count() + 1);

    // legacy signatures append the raw header after an empty barcode
    for sig in &state.signatures {
        assert!(sig.matches(':').count() >= 4);
        assert!(sig.ends_with(':') || sig.contains("::"));
    }
});
