use crate::error::AppError;
use crate::notify::{Notice, Notifier};
use tauri_winrt_notification::{Sound, Toast};

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&notice.title)
            .text1(&notice.body)
            .sound(Some(Sound::Default))
            .show()
            .map_err(|err| AppError::io(err.to_string()))
    }
}
