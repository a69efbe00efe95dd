// Hides and restores a window's taskbar button.
//
// Usage: taskbar_list <hwnd>   (hwnd as decimal or 0x-prefixed hex)

#[cfg(windows)]
fn main() -> Result<(), comrel::ComError> {
    use comrel::shell::{ITaskbarList, CLSID_TASKBAR_LIST, HWND};
    use comrel::{ClsCtx, ComApartment, ComPtr, Ole32, Releaser};

    let hwnd = std::env::args()
        .nth(1)
        .and_then(|arg| match arg.strip_prefix("0x") {
            Some(hex) => usize::from_str_radix(hex, 16).ok(),
            None => arg.parse().ok(),
        })
        .unwrap_or(0) as HWND;

    let runtime = Ole32;
    let _apartment = ComApartment::sta(&runtime)?;
    let rel = Releaser::new();

    let taskbar: &ITaskbarList =
        rel.create(&runtime, &CLSID_TASKBAR_LIST, ClsCtx::INPROC_SERVER)?;
    taskbar.hr_init()?;
    println!("ITaskbarList {} at {:p}", ITaskbarList::IID, taskbar.ppvt());

    if !hwnd.is_null() {
        taskbar.delete_tab(hwnd)?;
        taskbar.add_tab(hwnd)?;
        taskbar.activate_tab(hwnd)?;
    }
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("taskbar_list requires Windows");
}
