use log::warn;

/// Encodes an attributed ad index as a one-hot histogram of `histogram_size`
/// buckets. No attribution, or an index outside the histogram, gives an
/// all-zero histogram.
pub fn encode(histogram_size: usize, ad_index: Option<u32>) -> Vec<u8> {
    let mut measurement = vec![0; histogram_size];

    if let Some(index) = ad_index {
        match measurement.get_mut(index as usize) {
            Some(bucket) => *bucket = 1,
            None => warn!(
                "Dropping attribution to bucket {index}: exceeds histogram size {histogram_size}"
            ),
        }
    }

    measurement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot() {
        assert_eq!(encode(5, Some(1)), vec![0, 1, 0, 0, 0]);
        assert_eq!(encode(5, Some(4)), vec![0, 0, 0, 0, 1]);
        assert_eq!(encode(1, Some(0)), vec![1]);
    }

    #[test]
    fn test_no_match_is_all_zero() {
        assert_eq!(encode(5, None), vec![0; 5]);
        assert_eq!(encode(0, None), Vec::<u8>::new());
    }

    #[test]
    fn test_out_of_range_index_is_dropped() {
        assert_eq!(encode(5, Some(5)), vec![0; 5]);
        assert_eq!(encode(5, Some(u32::MAX)), vec![0; 5]);
    }
}
