use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// `HH:MM:SS`
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
/// `YYYY-MM-DD HH:MM:SS`
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..(0..=::std::cmp::min($query.len(), 497))
                .rev()
                .find(|i| $query.is_char_boundary(*i))
                .unwrap_or(0)]
                .trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
