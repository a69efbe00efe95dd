// Test-only crate for exercising comrel against scripted COM objects.

use comrel::{declare_com_ptr, GUID};

pub const CLSID_SCENARIO: GUID = GUID::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
pub const IID_SCENARIO: GUID = GUID::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

declare_com_ptr! {
    /// Interface with no methods beyond `IUnknown`, identified by `IID_SCENARIO`.
    pub struct IScenario: IUnknown {
        const IID: GUID = IID_SCENARIO;
    }
}
