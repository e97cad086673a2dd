use super::list::month_arg;
use super::open_store;
use crate::browser::MonthBrowser;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(month: Option<&str>) -> Result<()> {
    let month = month_arg(month)?;
    let store = open_store()?;
    let symbol = load_settings().currency_symbol;
    let today = chrono::Local::now().date_naive();
    let mut browser = MonthBrowser::new(store, symbol, today, month.as_deref());
    browser.run()?;
    Ok(())
}
