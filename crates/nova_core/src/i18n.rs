use time::Date;

pub const DEFAULT_LANGUAGE: &str = "tr";

enum DateStyle {
    /// "Friday, October 16"
    WeekdayMonthDay,
    /// "Freitag, 16. Oktober"
    WeekdayDayDotMonth,
    /// "16 Ekim Cuma"
    DayMonthWeekday,
}

struct Table {
    code: &'static str,
    locale: &'static str,
    entries: &'static [(&'static str, &'static str)],
    /// Sunday first.
    weekdays: [&'static str; 7],
    months: [&'static str; 12],
    date_style: DateStyle,
}

const TR: Table = Table {
    code: "tr",
    locale: "tr-TR",
    entries: &[
        ("focus", "Odaklan"),
        ("break", "Mola"),
        ("breakOver", "Mola bitti! Odaklanma zamanı."),
        ("workDone", "Harika iş! Mola zamanı."),
        ("catDaily", "Günlük"),
        ("catWeekly", "Haftalık"),
        ("catOther", "Diğer"),
        ("statToday", "Bugün"),
        ("statWeek", "Bu hafta"),
        ("statTotal", "Toplam"),
        ("notes", "Notlar"),
    ],
    weekdays: [
        "Pazar",
        "Pazartesi",
        "Salı",
        "Çarşamba",
        "Perşembe",
        "Cuma",
        "Cumartesi",
    ],
    months: [
        "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül",
        "Ekim", "Kasım", "Aralık",
    ],
    date_style: DateStyle::DayMonthWeekday,
};

const EN: Table = Table {
    code: "en",
    locale: "en-US",
    entries: &[
        ("focus", "Focus"),
        ("break", "Break"),
        ("breakOver", "Break is over! Time to focus."),
        ("workDone", "Great work! Time for a break."),
        ("catDaily", "Daily"),
        ("catWeekly", "Weekly"),
        ("catOther", "Other"),
        ("statToday", "Today"),
        ("statWeek", "This week"),
        ("statTotal", "Total"),
        ("notes", "Notes"),
    ],
    weekdays: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    date_style: DateStyle::WeekdayMonthDay,
};

const DE: Table = Table {
    code: "de",
    locale: "de-DE",
    entries: &[
        ("focus", "Fokus"),
        ("break", "Pause"),
        ("breakOver", "Pause vorbei! Zeit zum Fokussieren."),
        ("workDone", "Gute Arbeit! Zeit für eine Pause."),
        ("catDaily", "Täglich"),
        ("catWeekly", "Wöchentlich"),
        ("catOther", "Sonstiges"),
        ("statToday", "Heute"),
        ("statWeek", "Diese Woche"),
        ("statTotal", "Gesamt"),
        ("notes", "Notizen"),
    ],
    weekdays: [
        "Sonntag",
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
    ],
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    date_style: DateStyle::WeekdayDayDotMonth,
};

const TABLES: [&Table; 3] = [&TR, &EN, &DE];

fn table(code: &str) -> Option<&'static Table> {
    TABLES.into_iter().find(|table| table.code == code)
}

fn table_or_default(code: &str) -> &'static Table {
    table(code).unwrap_or(&TR)
}

pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    TABLES.into_iter().map(|table| table.code)
}

pub fn is_supported(code: &str) -> bool {
    table(code).is_some()
}

/// Looks `key` up in `language`'s table. Unknown languages use the default
/// table; unknown keys come back verbatim.
pub fn translate<'a>(language: &str, key: &'a str) -> &'a str {
    table_or_default(language)
        .entries
        .iter()
        .find(|(entry, _)| *entry == key)
        .map(|(_, value)| *value)
        .unwrap_or(key)
}

/// The active language.
#[derive(Clone, Copy)]
pub struct Translator {
    current: &'static Table,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.current.code)
            .finish()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self { current: &TR }
    }
}

impl Translator {
    pub fn new(language: &str) -> Self {
        Self {
            current: table_or_default(language),
        }
    }

    pub fn language(&self) -> &'static str {
        self.current.code
    }

    /// Switches language; unknown codes are refused and leave it unchanged.
    pub fn set_language(&mut self, code: &str) -> bool {
        match table(code) {
            Some(table) => {
                self.current = table;
                true
            }
            None => false,
        }
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(self.current.code, key)
    }

    pub fn date_locale(&self) -> &'static str {
        self.current.locale
    }

    pub fn format_long_date(&self, date: Date) -> String {
        let table = self.current;
        let weekday = table.weekdays[usize::from(date.weekday().number_days_from_sunday())];
        let month = table.months[usize::from(u8::from(date.month())) - 1];
        let day = date.day();

        match table.date_style {
            DateStyle::WeekdayMonthDay => format!("{weekday}, {month} {day}"),
            DateStyle::WeekdayDayDotMonth => format!("{weekday}, {day}. {month}"),
            DateStyle::DayMonthWeekday => format!("{day} {month} {weekday}"),
        }
    }
}
