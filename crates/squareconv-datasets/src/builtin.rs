use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use squareconv_core::SquareMatrix;
use squareconv_engine::Channel;

/// Load the demonstration job: one 5×5 input seen through three 3×3
/// filters, with an all-ones bias.
pub fn load_demo() -> (Vec<Channel<i64>>, SquareMatrix<i64>) {
    let input: Vec<i64> = vec![
        0, 1, 0, 2, 1,
        2, 2, 2, 0, 1,
        0, 1, 2, 1, 2,
        2, 1, 1, 1, 0,
        2, 1, 2, 1, 0,
    ];
    let filters: [Vec<i64>; 3] = [
        vec![-1, 0, -1, -1, -1, -1, 1, 0, -1],
        vec![0, -1, 0, -1, 0, 0, 1, 0, 1],
        vec![-1, 0, 1, -1, 1, -1, 1, 0, 1],
    ];

    let input = SquareMatrix::new(input, 5).expect("demo input");
    let channels = filters
        .into_iter()
        .map(|f| Channel::new(input.clone(), SquareMatrix::new(f, 3).expect("demo filter")))
        .collect();

    (channels, SquareMatrix::full(3, 1))
}

/// Generate a random job with cells in `-2..=2`.
///
/// Every channel gets its own input and filter; the bias matches the
/// filter size, since that is the output size.
pub fn make_random_job(
    n_channels: usize,
    input_size: usize,
    filter_size: usize,
    seed: Option<u64>,
) -> (Vec<Channel<i64>>, SquareMatrix<i64>) {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut random_matrix = |size: usize| {
        let data: Vec<i64> = (0..size * size).map(|_| rng.gen_range(-2..=2)).collect();
        SquareMatrix::new(data, size).expect("random matrix")
    };

    let channels = (0..n_channels)
        .map(|_| {
            let input = random_matrix(input_size);
            let filter = random_matrix(filter_size);
            Channel::new(input, filter)
        })
        .collect();
    let bias = random_matrix(filter_size);

    (channels, bias)
}
