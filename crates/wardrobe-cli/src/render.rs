//! Plain-text rendering for terminal output.

use chrono::{Datelike, NaiveDate};
use wardrobe_core::{
  calendar::CalendarView,
  outfit::{Outfit, describe_last_worn},
};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// A Monday-first month grid. Days with a record are marked with `*`.
pub fn month_grid(view: &CalendarView) -> String {
  let first = view.month.first_day();
  let last = view.month.last_day();

  let mut out = format!("{}\n", view.month);
  out.push_str(WEEKDAYS.join("  ").as_str());
  out.push('\n');

  let mut line = "    ".repeat(first.weekday().num_days_from_monday() as usize);
  for date in first.iter_days().take_while(|d| *d <= last) {
    let mark = if view.days.contains_key(&date) { '*' } else { ' ' };
    line.push_str(&format!("{:>2}{mark} ", date.day()));
    if date.weekday().num_days_from_monday() == 6 {
      out.push_str(line.trim_end());
      out.push('\n');
      line.clear();
    }
  }
  if !line.trim().is_empty() {
    out.push_str(line.trim_end());
    out.push('\n');
  }
  out
}

/// The grid followed by each recorded day and the month summary.
pub fn calendar(view: &CalendarView) -> String {
  let mut out = month_grid(view);
  out.push('\n');
  for (date, entry) in &view.days {
    out.push_str(&format!(
      "{date}  {} (formality {})\n",
      entry.outfit_name, entry.formality_level
    ));
  }
  if !view.days.is_empty() {
    out.push('\n');
  }
  let s = &view.summary;
  out.push_str(&format!(
    "{} days tracked, {} outfits, avg formality {}, most worn {}x\n",
    s.days_tracked, s.unique_outfits, s.avg_formality, s.most_worn_count
  ));
  out
}

/// One-line outfit card.
pub fn outfit_line(outfit: &Outfit, today: NaiveDate) -> String {
  format!(
    "{}  rating {}/5  formality {}/5  {} items  {}  [{}]",
    outfit.name,
    outfit.rating,
    outfit.formality_level,
    outfit.items.len(),
    describe_last_worn(outfit.stats.last_worn_date, today),
    outfit.outfit_id,
  )
}

/// Multi-line outfit card used by the recommendation prompt.
pub fn outfit_card(outfit: &Outfit, today: NaiveDate) -> String {
  let mut out = outfit_line(outfit, today);
  out.push('\n');
  for item in &outfit.items {
    out.push_str(&format!("  - {} ({})\n", item.name, item.category));
  }
  if let Some(memo) = outfit.memo.as_deref().filter(|m| !m.is_empty()) {
    out.push_str(&format!("  {memo}\n"));
  }
  out
}
