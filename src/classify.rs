//! Discipline classification of raw entity type names.
//!
//! Rule tables are keyed by upper-cased names. IFC names cover both IFC2x3
//! and IFC4; Revit names are built-in category identifiers (`OST_...`).
//! DGN carries no entity taxonomy of its own, so DGN element names resolve
//! to [`Discipline::Unknown`].

use crate::model::Discipline;

const IFC_RULES: &[(&str, Discipline)] = &[
    // Architecture
    ("IFCWALL", Discipline::Architecture),
    ("IFCCURTAINWALL", Discipline::Architecture),
    ("IFCDOOR", Discipline::Architecture),
    ("IFCWINDOW", Discipline::Architecture),
    ("IFCROOF", Discipline::Architecture),
    ("IFCCOVERING", Discipline::Architecture),
    ("IFCSTAIR", Discipline::Architecture),
    ("IFCSTAIRFLIGHT", Discipline::Architecture),
    ("IFCRAMP", Discipline::Architecture),
    ("IFCRAMPFLIGHT", Discipline::Architecture),
    ("IFCRAILING", Discipline::Architecture),
    ("IFCSPACE", Discipline::Architecture),
    ("IFCFURNISHINGELEMENT", Discipline::Architecture),
    ("IFCFURNITURE", Discipline::Architecture),
    ("IFCSYSTEMFURNITUREELEMENT", Discipline::Architecture),
    ("IFCSHADINGDEVICE", Discipline::Architecture),
    // Structure
    ("IFCBEAM", Discipline::Structure),
    ("IFCCOLUMN", Discipline::Structure),
    ("IFCSLAB", Discipline::Structure),
    ("IFCFOOTING", Discipline::Structure),
    ("IFCPILE", Discipline::Structure),
    ("IFCMEMBER", Discipline::Structure),
    ("IFCPLATE", Discipline::Structure),
    ("IFCBEARING", Discipline::Structure),
    ("IFCTENDON", Discipline::Structure),
    ("IFCTENDONANCHOR", Discipline::Structure),
    ("IFCREINFORCINGBAR", Discipline::Structure),
    ("IFCREINFORCINGMESH", Discipline::Structure),
    ("IFCMECHANICALFASTENER", Discipline::Structure),
    ("IFCFASTENER", Discipline::Structure),
    // Electrical
    ("IFCCABLESEGMENT", Discipline::Electrical),
    ("IFCCABLEFITTING", Discipline::Electrical),
    ("IFCCABLECARRIERSEGMENT", Discipline::Electrical),
    ("IFCCABLECARRIERFITTING", Discipline::Electrical),
    ("IFCLIGHTFIXTURE", Discipline::Electrical),
    ("IFCLAMP", Discipline::Electrical),
    ("IFCOUTLET", Discipline::Electrical),
    ("IFCSWITCHINGDEVICE", Discipline::Electrical),
    ("IFCJUNCTIONBOX", Discipline::Electrical),
    ("IFCPROTECTIVEDEVICE", Discipline::Electrical),
    ("IFCELECTRICAPPLIANCE", Discipline::Electrical),
    ("IFCELECTRICDISTRIBUTIONBOARD", Discipline::Electrical),
    ("IFCELECTRICDISTRIBUTIONPOINT", Discipline::Electrical),
    ("IFCELECTRICGENERATOR", Discipline::Electrical),
    ("IFCELECTRICMOTOR", Discipline::Electrical),
    ("IFCELECTRICFLOWSTORAGEDEVICE", Discipline::Electrical),
    ("IFCTRANSFORMER", Discipline::Electrical),
    ("IFCSOLARDEVICE", Discipline::Electrical),
    // Plumbing
    ("IFCPIPESEGMENT", Discipline::Plumbing),
    ("IFCPIPEFITTING", Discipline::Plumbing),
    ("IFCSANITARYTERMINAL", Discipline::Plumbing),
    ("IFCWASTETERMINAL", Discipline::Plumbing),
    ("IFCSTACKTERMINAL", Discipline::Plumbing),
    ("IFCFIRESUPPRESSIONTERMINAL", Discipline::Plumbing),
    ("IFCINTERCEPTOR", Discipline::Plumbing),
    ("IFCVALVE", Discipline::Plumbing),
    ("IFCPUMP", Discipline::Plumbing),
    ("IFCTANK", Discipline::Plumbing),
    ("IFCFLOWMETER", Discipline::Plumbing),
    // HVAC
    ("IFCDUCTSEGMENT", Discipline::Hvac),
    ("IFCDUCTFITTING", Discipline::Hvac),
    ("IFCDUCTSILENCER", Discipline::Hvac),
    ("IFCAIRTERMINAL", Discipline::Hvac),
    ("IFCAIRTERMINALBOX", Discipline::Hvac),
    ("IFCAIRTOAIRHEATRECOVERY", Discipline::Hvac),
    ("IFCDAMPER", Discipline::Hvac),
    ("IFCFAN", Discipline::Hvac),
    ("IFCFILTER", Discipline::Hvac),
    ("IFCBOILER", Discipline::Hvac),
    ("IFCBURNER", Discipline::Hvac),
    ("IFCCHILLER", Discipline::Hvac),
    ("IFCCOIL", Discipline::Hvac),
    ("IFCCOMPRESSOR", Discipline::Hvac),
    ("IFCCONDENSER", Discipline::Hvac),
    ("IFCCOOLEDBEAM", Discipline::Hvac),
    ("IFCCOOLINGTOWER", Discipline::Hvac),
    ("IFCEVAPORATIVECOOLER", Discipline::Hvac),
    ("IFCEVAPORATOR", Discipline::Hvac),
    ("IFCHEATEXCHANGER", Discipline::Hvac),
    ("IFCHUMIDIFIER", Discipline::Hvac),
    ("IFCSPACEHEATER", Discipline::Hvac),
    ("IFCUNITARYEQUIPMENT", Discipline::Hvac),
];

/// Suffixes that fold a variant or type object onto its base entity,
/// e.g. `IFCWALLSTANDARDCASE` and `IFCDOORSTYLE`.
const IFC_FOLDED_SUFFIXES: &[&str] = &["STANDARDCASE", "ELEMENTEDCASE", "TYPE", "STYLE"];

const REVIT_RULES: &[(&str, Discipline)] = &[
    ("OST_WALLS", Discipline::Architecture),
    ("OST_CURTAINWALLPANELS", Discipline::Architecture),
    ("OST_DOORS", Discipline::Architecture),
    ("OST_WINDOWS", Discipline::Architecture),
    ("OST_ROOFS", Discipline::Architecture),
    ("OST_CEILINGS", Discipline::Architecture),
    ("OST_FLOORS", Discipline::Architecture),
    ("OST_STAIRS", Discipline::Architecture),
    ("OST_RAMPS", Discipline::Architecture),
    ("OST_RAILINGS", Discipline::Architecture),
    ("OST_ROOMS", Discipline::Architecture),
    ("OST_FURNITURE", Discipline::Architecture),
    ("OST_STRUCTURALCOLUMNS", Discipline::Structure),
    ("OST_STRUCTURALFRAMING", Discipline::Structure),
    ("OST_STRUCTURALFOUNDATION", Discipline::Structure),
    ("OST_STRUCTURALTRUSS", Discipline::Structure),
    ("OST_REBAR", Discipline::Structure),
    ("OST_ELECTRICALEQUIPMENT", Discipline::Electrical),
    ("OST_ELECTRICALFIXTURES", Discipline::Electrical),
    ("OST_LIGHTINGFIXTURES", Discipline::Electrical),
    ("OST_LIGHTINGDEVICES", Discipline::Electrical),
    ("OST_CABLETRAY", Discipline::Electrical),
    ("OST_CONDUIT", Discipline::Electrical),
    ("OST_PIPECURVES", Discipline::Plumbing),
    ("OST_PIPEFITTING", Discipline::Plumbing),
    ("OST_PIPEACCESSORY", Discipline::Plumbing),
    ("OST_PLUMBINGFIXTURES", Discipline::Plumbing),
    ("OST_SPRINKLERS", Discipline::Plumbing),
    ("OST_DUCTCURVES", Discipline::Hvac),
    ("OST_DUCTFITTING", Discipline::Hvac),
    ("OST_DUCTACCESSORY", Discipline::Hvac),
    ("OST_DUCTTERMINAL", Discipline::Hvac),
    ("OST_FLEXDUCTCURVES", Discipline::Hvac),
    ("OST_MECHANICALEQUIPMENT", Discipline::Hvac),
];

/// Maps a raw entity type name to its discipline.
///
/// Total and deterministic: matching is case-insensitive and ignores
/// surrounding whitespace, and anything not in the rule tables is
/// [`Discipline::Unknown`].
///
/// # Example
///
/// ```
/// use bim_ingest::classify::classify;
/// use bim_ingest::model::Discipline;
///
/// assert_eq!(classify("IfcWall"), Discipline::Architecture);
/// assert_eq!(classify("IFCDUCTSEGMENT"), Discipline::Hvac);
/// assert_eq!(classify("IfcAnnotation"), Discipline::Unknown);
/// ```
#[must_use]
pub fn classify(raw_type: &str) -> Discipline {
    let name = raw_type.trim().to_ascii_uppercase();

    if name.starts_with("OST_") {
        return lookup(REVIT_RULES, &name).unwrap_or_default();
    }
    if name.starts_with("IFC") {
        return classify_ifc(&name);
    }

    Discipline::Unknown
}

fn classify_ifc(name: &str) -> Discipline {
    if let Some(discipline) = lookup(IFC_RULES, name) {
        return discipline;
    }

    IFC_FOLDED_SUFFIXES
        .iter()
        .filter_map(|suffix| name.strip_suffix(suffix))
        .find_map(|base| lookup(IFC_RULES, base))
        .unwrap_or_default()
}

fn lookup(rules: &[(&str, Discipline)], name: &str) -> Option<Discipline> {
    rules
        .iter()
        .find(|(rule, _)| *rule == name)
        .map(|(_, discipline)| *discipline)
}
