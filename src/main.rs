fn main() -> eframe::Result {
    mapdesk::run_gui()
}
