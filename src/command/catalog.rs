//! SDF object types and the project folders their definitions are imported into.

/// One importable object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectType {
    pub label: &'static str,
    pub type_id: &'static str,
    pub destination: &'static str,
}

impl ObjectType {
    pub fn is_supported(&self) -> bool {
        !UNSUPPORTED_OBJECT_TYPES.contains(&self.type_id)
    }
}

/// Types the CLI cannot import by script id.
pub const UNSUPPORTED_OBJECT_TYPES: &[&str] = &["savedsearch", "emailtemplate"];

macro_rules! object_type {
    ($label:expr, $type_id:expr, $destination:expr) => {
        ObjectType {
            label: $label,
            type_id: $type_id,
            destination: $destination,
        }
    };
}

pub const OBJECT_TYPES: &[ObjectType] = &[
    object_type!("Bundle Installation Scripts", "bundleinstallationscript", "/Objects/Scripts/BundleInstallation"),
    object_type!("Centers", "center", "/Objects/CentersAndTabs/Center"),
    object_type!("Center Categories", "centercategory", "/Objects/CentersAndTabs/Category"),
    object_type!("Center Tabs", "centertab", "/Objects/CentersAndTabs/Tab"),
    object_type!("Client Scripts", "clientscript", "/Objects/Scripts/Client"),
    object_type!("CRM Custom Fields", "crmcustomfield", "/Objects/Fields/CRM"),
    object_type!("Custom Plugins", "customglplugin", "/Objects/Plugins/Custom"),
    object_type!("Custom Lists", "customlist", "/Objects/Lists"),
    object_type!("Custom Records", "customrecordtype", "/Objects/Records"),
    object_type!("Email Capture Plugins", "emailcaptureplugin", "/Objects/Plugins/Email"),
    object_type!("Email Templates", "emailtemplate", "/Objects/Templates/Email"),
    object_type!("Entity Custom Fields", "entitycustomfield", "/Objects/Fields/Entity"),
    object_type!("Entity Forms", "entryForm", "/Objects/Forms/EntryForm"),
    object_type!("Item Custom Fields", "itemcustomfield", "/Objects/Fields/Item"),
    object_type!("Item Number Custom Fields", "itemnumbercustomfield", "/Objects/Fields/ItemNumber"),
    object_type!("Item Option Custom Fields", "itemoptioncustomfield", "/Objects/Fields/ItemOption"),
    object_type!("Map Reduce Scripts", "mapreducescript", "/Objects/Scripts/MapReduce"),
    object_type!("Mass Update Scripts", "massupdatescript", "/Objects/Scripts/MassUpdate"),
    object_type!("Other Custom Fields", "othercustomfield", "/Objects/Fields/Other"),
    object_type!("Portlets", "portlet", "/Objects/Scripts/Portlet"),
    object_type!("Promotion Plugins", "promotionsplugin", "/Objects/Plugins/Promotion"),
    object_type!("Restlets", "restlet", "/Objects/Scripts/Restlet"),
    object_type!("Roles", "role", "/Objects/Roles"),
    object_type!("Saved Searches", "savedsearch", "/Objects/SavedSearches"),
    object_type!("Scheduled Scripts", "scheduledscript", "/Objects/Scripts/Scheduled"),
    object_type!("Sub Tabs", "subtab", "/Objects/CentersAndTabs/SubTab"),
    object_type!("Suitelets", "suitelet", "/Objects/Scripts/Suitelet"),
    object_type!("Transaction Body Custom Fields", "transactionbodycustomfield", "/Objects/Fields/TransactionBody"),
    object_type!("Transaction Column Custom Fields", "transactioncolumncustomfield", "/Objects/Fields/TransactionColumn"),
    object_type!("Transaction Forms", "transactionForm", "/Objects/Forms/TransactionForm"),
    object_type!("User Event Scripts", "usereventscript", "/Objects/Scripts/UserEvent"),
    object_type!("Workflow Action Scripts", "workflowactionscript", "/Objects/Scripts/WorkflowAction"),
    object_type!("Workflows", "workflow", "/Objects/Workflows"),
];

/// Object types that can be imported.
pub fn supported_object_types() -> impl Iterator<Item = &'static ObjectType> {
    OBJECT_TYPES.iter().filter(|t| t.is_supported())
}

pub fn find_by_label(label: &str) -> Option<&'static ObjectType> {
    OBJECT_TYPES.iter().find(|t| t.label == label)
}

pub fn find_by_type_id(type_id: &str) -> Option<&'static ObjectType> {
    OBJECT_TYPES.iter().find(|t| t.type_id == type_id)
}
