use crate::core::models::modality::Modality;
use phf::{Map, phf_map};

/// Default scaffold of every modality that has one, keyed by modality name.
static MODALITY_TEMPLATES: Map<&'static str, &'static str> = phf_map! {
    "affibody" => "VDNKFNKELSVAGREIVTLPNLNDPQKKAFIFSLWDDPSQSANLLAEAKKLNDAQAPK",
    "nanobody" => "AQVQLQESGGGLVQAGGSLRLSCAASERTFSTYAMGWFRQAPGREREFLAQINWSGTTTYYAESVKDRTTISRDNAKNTVYLEMNNLNADDTGIYFCAAHPQRGWGSTLGWTYWGQGTQVTVSSGGGGSGGGKPIPNPLLGLDSTRTGHHHHHH",
    "affitin" => "MRGSHHHHHHGSVKVKFVSSGEEKEVDTSKIKKVWRNLTKYGTIVQFTYDDNGKTGRGYVRELDAPKELLDMLARAEGKLN",
};

/// Built-in template for `modality`; `None` for [`Modality::Custom`].
pub fn default_template(modality: Modality) -> Option<&'static str> {
    MODALITY_TEMPLATES.get(modality.as_str()).copied()
}
