//! Header alias patterns.
//!
//! Patterns run against [`normalize_header`](crate::utils::normalize_header)
//! output: lowercase words separated by single spaces. "Strong" patterns are
//! anchored and describe the whole header; "weak" ones only need to appear
//! somewhere in it.

use roster_model::TargetField;

/// Words that put a header in guardian context.
macro_rules! guardian_words {
    () => {
        r"(?:parent|guardian|mother|father|mom|mum|dad|caregiver|carer|contact|emergency contact)s?"
    };
}

/// Optional slot marker around a guardian word ("parent 2", "secondary guardian").
macro_rules! slot_words {
    () => {
        r"(?:1|2|one|two|primary|secondary|second|alternate|alt|other)"
    };
}

/// Guardian-context detector for student-field penalties.
pub(crate) const GUARDIAN_CONTEXT: &str = concat!(r"\b", guardian_words!(), r"\b");

/// Headers that describe another entity and should not feed student fields.
pub(crate) const ENTITY_CONTEXT: &str =
    r"\b(?:school|class|classroom|homeroom|teacher|course|section|campus|room)\b";

/// Slot markers pointing at the second guardian.
pub(crate) const SECOND_SLOT: &str = r"\b(?:2|two|second|secondary|alternate|alt|other)\b";

/// Slot markers pointing at the first guardian.
pub(crate) const FIRST_SLOT: &str = r"\b(?:1|one|primary)\b";

/// Regex sources for one field.
pub(crate) struct AliasPatterns {
    pub strong: &'static [&'static str],
    pub weak: &'static [&'static str],
}

const GUARDIAN_NAME: AliasPatterns = AliasPatterns {
    strong: &[
        concat!(
            r"^(?:",
            slot_words!(),
            r" )?",
            guardian_words!(),
            r"(?: ",
            slot_words!(),
            r")?(?: full)?(?: name)?$"
        ),
        concat!(r"^name of ", guardian_words!(), r"(?: ", slot_words!(), r")?$"),
    ],
    weak: &[concat!(r"\b", guardian_words!(), r"\b.*\bname\b")],
};

const GUARDIAN_EMAIL: AliasPatterns = AliasPatterns {
    strong: &[concat!(
        r"^(?:",
        slot_words!(),
        r" )?",
        guardian_words!(),
        r"(?: ",
        slot_words!(),
        r")? e ?mail(?: address)?(?: ",
        slot_words!(),
        r")?$"
    )],
    weak: &[
        concat!(r"\b", guardian_words!(), r"\b.*\be ?mail\b"),
        concat!(r"\be ?mail\b.*\b", guardian_words!(), r"\b"),
    ],
};

const GUARDIAN_PHONE: AliasPatterns = AliasPatterns {
    strong: &[concat!(
        r"^(?:",
        slot_words!(),
        r" )?",
        guardian_words!(),
        r"(?: ",
        slot_words!(),
        r")?(?: home| cell| mobile| work| day)? (?:phone|telephone|tel|mobile|cell)(?: number| no)?(?: ",
        slot_words!(),
        r")?$"
    )],
    weak: &[
        concat!(r"\b", guardian_words!(), r"\b.*\b(?:phone|telephone|tel|mobile|cell)\b"),
        r"^(?:home |cell |mobile |contact )?(?:phone|telephone)(?: number| no)?$",
    ],
};

const GUARDIAN_RELATIONSHIP: AliasPatterns = AliasPatterns {
    strong: &[
        concat!(
            r"^(?:",
            guardian_words!(),
            r" )?(?:",
            slot_words!(),
            r" )?(?:relationship|relation)(?: to student| to child)?(?: ",
            slot_words!(),
            r")?$"
        ),
        concat!(
            r"^",
            guardian_words!(),
            r"(?: ",
            slot_words!(),
            r")? (?:relationship|relation|type|role)$"
        ),
    ],
    weak: &[r"\brelation(?:ship)?\b"],
};

/// Returns the alias patterns for a field.
///
/// Guardian slots share one pattern set; slot disambiguation happens in
/// scoring.
pub(crate) fn aliases(field: TargetField) -> AliasPatterns {
    use TargetField as F;
    match field {
        F::First => AliasPatterns {
            strong: &[
                r"^(?:student |child |pupil |legal |preferred )?(?:first|given|fore) ?name$",
                r"^(?:student |child |pupil )?(?:first|given|fname|forename)$",
            ],
            weak: &[r"\b(?:first|given|fname|forename)\b"],
        },
        F::Last => AliasPatterns {
            strong: &[
                r"^(?:student |child |pupil |legal )?(?:last|family|sur) ?name$",
                r"^(?:student |child |pupil )?(?:last|lname|surname)$",
            ],
            weak: &[r"\b(?:last|surname|lname)\b", r"\bfamily name\b"],
        },
        F::StudentExternalId => AliasPatterns {
            strong: &[
                r"^(?:student |pupil )?(?:id|number|no|num|code)$",
                r"^(?:sis|oen|osis|lasid|sasid)(?: id| number| no)?$",
                r"^(?:state|local|external|district|school)(?: student)? (?:id|number|no)$",
                r"^student (?:id|identifier) (?:number|no|num)$",
            ],
            weak: &[
                r"\b(?:id|identifier)\b",
                r"\bstudent (?:number|no|num|code)\b",
            ],
        },
        F::Grade => AliasPatterns {
            strong: &[
                r"^(?:student |current )?(?:grade|gr|grade level|grade lvl|year|yr|year level|year group|level)$",
            ],
            weak: &[r"\b(?:grade|gr|yr)\b", r"\byear (?:level|group)\b"],
        },
        F::StudentEmail => AliasPatterns {
            strong: &[r"^(?:student |pupil |school )?e ?mail(?: address)?$"],
            weak: &[r"\be ?mail\b"],
        },
        F::Gender => AliasPatterns {
            strong: &[r"^(?:student )?(?:gender|sex)(?: identity)?$"],
            weak: &[r"\b(?:gender|sex)\b"],
        },
        F::Pronouns => AliasPatterns {
            strong: &[r"^(?:student |preferred )?pronouns?$"],
            weak: &[r"\bpronouns?\b"],
        },
        F::Iep => AliasPatterns {
            strong: &[
                r"^(?:has )?iep(?: status| flag| plan)?$",
                r"^individuali[sz]ed education (?:plan|program)$",
                r"^special (?:ed|education)$",
            ],
            weak: &[r"\biep\b", r"\bspecial ed(?:ucation)?\b", r"\beducation plan\b"],
        },
        F::Ell => AliasPatterns {
            strong: &[
                r"^(?:is )?(?:ell|esl|eld|ml|mll|ell status|esl status)$",
                r"^english (?:language )?learner$",
                r"^multilingual learner$",
            ],
            weak: &[
                r"\b(?:ell|esl|eld)\b",
                r"\benglish (?:language )?learner\b",
                r"\bmultilingual\b",
            ],
        },
        F::Medical => AliasPatterns {
            strong: &[
                r"^(?:medical|health)(?: alerts?| notes?| conditions?| concerns?| flag)?$",
                r"^(?:allergy|allergies)$",
            ],
            weak: &[r"\b(?:medical|health|allerg(?:y|ies))\b"],
        },
        F::School => AliasPatterns {
            strong: &[r"^(?:school|campus|building)(?: name)?$"],
            weak: &[r"\bschool\b", r"\bcampus\b"],
        },
        F::Classroom => AliasPatterns {
            strong: &[
                r"^(?:class|classroom|homeroom|home room|section|course|period)(?: name| code)?$",
            ],
            weak: &[r"\b(?:class|classroom|homeroom|section|course|period)\b"],
        },
        F::Guardian1Name | F::Guardian2Name => GUARDIAN_NAME,
        F::Guardian1Email | F::Guardian2Email => GUARDIAN_EMAIL,
        F::Guardian1Phone | F::Guardian2Phone => GUARDIAN_PHONE,
        F::Guardian1Relationship | F::Guardian2Relationship => GUARDIAN_RELATIONSHIP,
    }
}
