use crate::ByteRing;

#[test]
fn split_run_across_the_seam() {
    let ring = ByteRing::new(10);
    ring.write(&[0xaa; 8]);

    let mut skip = [0; 6];
    ring.read(&mut skip);
    ring.write(&[0xbb; 6]);

    let mut buf = [0; 8];
    ring.read(&mut buf);
    assert_eq!(buf, [0xaa, 0xaa, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb]);
}

#[test]
fn run_ending_exactly_at_the_seam() {
    let ring = ByteRing::new(8);
    ring.write(&[1; 8]);
    let mut buf = [0; 8];
    ring.read(&mut buf);
    assert_eq!(buf, [1; 8]);

    // The cursors wrapped to the start, so the next full run is contiguous.
    ring.write(&[2; 8]);
    ring.read(&mut buf);
    assert_eq!(buf, [2; 8]);
}

#[test]
fn many_laps_preserve_the_stream() {
    let ring = ByteRing::new(7);
    let mut next_in = 0u8;
    let mut next_out = 0u8;

    for &chunk in [3usize, 5, 2, 7, 4, 6, 1, 5, 3, 2].iter().cycle().take(200) {
        let mut src = [0u8; 7];
        for b in &mut src[..chunk] {
            *b = next_in;
            next_in = next_in.wrapping_add(1);
        }
        ring.write(&src[..chunk]);

        let mut dst = [0u8; 7];
        ring.read(&mut dst[..chunk]);
        for &b in &dst[..chunk] {
            assert_eq!(b, next_out);
            next_out = next_out.wrapping_add(1);
        }
    }
}
