use crate::{AppState, Effect, ExportStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            // Only the first mount fetches; later renders reuse the snapshot.
            if state.begin_load() {
                vec![Effect::FetchStatewise]
            } else {
                Vec::new()
            }
        }
        Msg::StatsLoaded { records, totals } => {
            state.apply_loaded(records, totals);
            Vec::new()
        }
        Msg::LoadFailed(reason) => {
            state.apply_load_failed(reason);
            Vec::new()
        }
        Msg::SortRequested(key) => {
            state.apply_sort_click(key);
            Vec::new()
        }
        Msg::SearchChanged(text) => {
            state.apply_search(text);
            Vec::new()
        }
        Msg::PageChanged(index) => {
            state.go_to_page(index);
            Vec::new()
        }
        Msg::NextPage => {
            state.next_page();
            Vec::new()
        }
        Msg::PreviousPage => {
            state.previous_page();
            Vec::new()
        }
        Msg::PageSizeChanged(size) => {
            state.set_page_size(size);
            Vec::new()
        }
        Msg::ExportRequested { destination } => {
            let records = state.sorted_view();
            state.set_export_status(ExportStatus::Pending);
            vec![Effect::ExportCsv {
                records,
                destination,
            }]
        }
        Msg::ExportFinished(status) => {
            state.set_export_status(status);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
