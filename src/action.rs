use crate::controller::FetchOutcome;

#[derive(Debug)]
pub enum Action {
    Quit,

    // Page host
    Navigate(String),

    // Address bar
    EditAddress,
    AddressInput(char),
    AddressBackspace,
    AddressConfirm,
    AddressCancel,

    // Quote panel
    SelectNext,
    SelectPrev,
    ShowMore,
    Reload,
    OpenInBrowser,
    YankUrl,

    // Fetch results coming back from spawned tasks
    QuotesFetched(FetchOutcome),

    None,
}
