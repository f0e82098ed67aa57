/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest, so `"chicken STOCK"` becomes `"Chicken Stock"` and `"o'neil"` becomes
/// `"O'Neil"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!("Chicken Stock", title_case("chicken STOCK"));
        assert_eq!("Side Dish", title_case(" side dish").trim());
        assert_eq!("O'Neil", title_case("o'neil"));
        assert_eq!("2Nd Course", title_case("2nd course"));
        assert_eq!("", title_case(""));
    }
}
