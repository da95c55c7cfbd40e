/// Converts a mixed-case field name into a lowercase, underscore separated
/// column name: `UserId` becomes `user_id`.
///
/// An uppercase letter anywhere but the first position is preceded by an
/// underscore. Digits and existing underscores are kept as they are, so names
/// that are already snake case come back unchanged.
pub fn to_column_name(field: &str) -> String {
    let mut column = String::with_capacity(field.len() + 4);
    for (i, ch) in field.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                column.push('_');
            }
            column.extend(ch.to_lowercase());
        } else {
            column.push(ch);
        }
    }
    column
}
