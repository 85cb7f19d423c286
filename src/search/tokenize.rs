const FUZZY_FRACTION: f32 = 0.2;
const MAX_FUZZY_DISTANCE: usize = 6;

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '_' | '/' | '.' | ',' | ':' | ';')
}

/// Splits on whitespace and `- _ / . , : ;`, lowercases, drops empty pieces.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(is_separator)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Edit budget for fuzzy matching a query term.
pub fn max_edit_distance(term: &str) -> usize {
    let length = term.chars().count() as f32;
    ((length * FUZZY_FRACTION).round() as usize).min(MAX_FUZZY_DISTANCE)
}

/// Levenshtein distance over chars, abandoning early once every cell of a
/// row exceeds `limit`.
pub fn edit_distance_within(left: &str, right: &str, limit: usize) -> Option<usize> {
    let left = left.chars().collect::<Vec<_>>();
    let right = right.chars().collect::<Vec<_>>();
    if left.len().abs_diff(right.len()) > limit {
        return None;
    }

    let mut previous = (0..=right.len()).collect::<Vec<_>>();
    let mut current = vec![0; right.len() + 1];
    for (row, left_ch) in left.iter().enumerate() {
        current[0] = row + 1;
        let mut row_min = current[0];
        for (column, right_ch) in right.iter().enumerate() {
            let substitution = previous[column] + usize::from(left_ch != right_ch);
            let value = substitution
                .min(previous[column + 1] + 1)
                .min(current[column] + 1);
            current[column + 1] = value;
            row_min = row_min.min(value);
        }
        if row_min > limit {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    let distance = previous[right.len()];
    (distance <= limit).then_some(distance)
}
