#[cfg(test)]
mod tests {
    use super::super::indicators::*;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), 3);
        // First value is SMA(3) of the first three prices
        assert!((result[0] - 2.0).abs() < 0.001);
        // EMA reacts toward newer prices but lags them
        assert!(result[2] > result[1]);
        assert!(result[2] < 5.0);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema(&[1.0, 2.0], 5).is_empty());
        assert!(ema(&[], 3).is_empty());
    }

    #[test]
    fn test_rsi_range() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert!(!result.is_empty());
        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains_saturates() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&data, 14);

        assert!(!result.is_empty());
        // Monotonic rise: no losses, RSI pinned at 100
        assert!((result[result.len() - 1] - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&[1.0, 2.0, 3.0], 14).is_empty());
    }

    #[test]
    fn test_macd_line_and_signal() {
        let data: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let result = macd(&data, 12, 26, 9);

        assert!(!result.macd_line.is_empty());
        assert!(!result.signal_line.is_empty());
        assert!(result.signal_line.len() <= result.macd_line.len());
    }

    #[test]
    fn test_macd_invalid_periods() {
        let data = sample_prices();
        // slow < fast is rejected
        let result = macd(&data, 26, 12, 9);
        assert!(result.macd_line.is_empty());
        assert!(result.signal_line.is_empty());
    }

    #[test]
    fn test_bollinger_bands_ordering() {
        let prices = sample_prices();
        let bb = bollinger_bands(&prices, 20, 2.0);

        assert_eq!(bb.upper.len(), 1);
        assert_eq!(bb.middle.len(), 1);
        assert_eq!(bb.lower.len(), 1);
        assert!(bb.upper[0] > bb.middle[0]);
        assert!(bb.middle[0] > bb.lower[0]);
    }

    #[test]
    fn test_bollinger_bands_flat_series() {
        let data = vec![50.0; 25];
        let bb = bollinger_bands(&data, 20, 2.0);

        // Zero variance: all three bands collapse onto the mean
        assert!((bb.upper[bb.upper.len() - 1] - 50.0).abs() < 0.001);
        assert!((bb.lower[bb.lower.len() - 1] - 50.0).abs() < 0.001);
    }
}
