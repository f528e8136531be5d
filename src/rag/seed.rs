//! Built-in healthcare documents loaded into an empty knowledge base

use crate::models::Metadata;

/// A sample document: content, category, condition
pub struct SeedDocument {
    pub content: &'static str,
    pub category: &'static str,
    pub condition: &'static str,
}

impl SeedDocument {
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("category".to_string(), self.category.to_string());
        metadata.insert("condition".to_string(), self.condition.to_string());
        metadata
    }
}

pub const SEED_DOCUMENTS: &[SeedDocument] = &[
    SeedDocument {
        content: "Hypertension, also known as high blood pressure, is a condition where the force of blood against artery walls is consistently too high. Normal blood pressure is below 120/80 mmHg. Treatment includes lifestyle changes like diet, exercise, and medication such as ACE inhibitors or beta-blockers.",
        category: "cardiovascular",
        condition: "hypertension",
    },
    SeedDocument {
        content: "Type 2 diabetes is a chronic condition affecting how the body processes blood sugar (glucose). Symptoms include increased thirst, frequent urination, and fatigue. Management involves blood sugar monitoring, healthy eating, regular exercise, and medications like metformin or insulin if needed.",
        category: "endocrine",
        condition: "diabetes",
    },
    SeedDocument {
        content: "Asthma is a respiratory condition where airways narrow and swell, producing extra mucus. Common symptoms include wheezing, shortness of breath, chest tightness, and coughing. Treatment typically includes quick-relief inhalers (bronchodilators) and long-term control medications like inhaled corticosteroids.",
        category: "respiratory",
        condition: "asthma",
    },
    SeedDocument {
        content: "Depression is a mood disorder causing persistent feelings of sadness and loss of interest. Symptoms include low energy, sleep problems, and difficulty concentrating. Treatment options include psychotherapy (cognitive behavioral therapy), medications (SSRIs like sertraline), and lifestyle modifications.",
        category: "mental_health",
        condition: "depression",
    },
    SeedDocument {
        content: "Osteoarthritis is the most common form of arthritis, caused by wear and tear of joint cartilage. It commonly affects knees, hips, hands, and spine. Symptoms include joint pain, stiffness, and reduced flexibility. Treatment includes pain relievers, physical therapy, and in severe cases, joint replacement surgery.",
        category: "musculoskeletal",
        condition: "osteoarthritis",
    },
    SeedDocument {
        content: "Migraine headaches are severe, recurring headaches often accompanied by nausea, vomiting, and sensitivity to light and sound. They can last hours to days. Treatment includes pain-relieving medications (triptans), preventive medications (beta-blockers, anticonvulsants), and identifying trigger avoidance.",
        category: "neurological",
        condition: "migraine",
    },
    SeedDocument {
        content: "Gastroesophageal reflux disease (GERD) occurs when stomach acid frequently flows back into the esophagus. Symptoms include heartburn, chest pain, and difficulty swallowing. Treatment includes lifestyle changes, antacids, H2 blockers, or proton pump inhibitors like omeprazole.",
        category: "digestive",
        condition: "gerd",
    },
    SeedDocument {
        content: "Chronic kidney disease (CKD) is the gradual loss of kidney function over time. Early stages often have no symptoms. As it progresses, symptoms include fatigue, swelling, and changes in urination. Management focuses on treating underlying causes, controlling blood pressure, and in advanced stages, dialysis or transplant.",
        category: "renal",
        condition: "chronic_kidney_disease",
    },
    SeedDocument {
        content: "Atrial fibrillation (AFib) is an irregular and often rapid heart rhythm that can increase risk of stroke and heart failure. Symptoms include palpitations, fatigue, and shortness of breath. Treatment may include medications to control heart rate and rhythm, blood thinners to prevent stroke, and sometimes procedures like cardioversion or ablation.",
        category: "cardiovascular",
        condition: "atrial_fibrillation",
    },
    SeedDocument {
        content: "Allergic rhinitis (hay fever) is an allergic response causing sneezing, congestion, runny nose, and itchy eyes. It can be seasonal or year-round. Treatment includes avoiding allergens, antihistamines, nasal corticosteroids, and in some cases, immunotherapy (allergy shots).",
        category: "immunological",
        condition: "allergic_rhinitis",
    },
];
