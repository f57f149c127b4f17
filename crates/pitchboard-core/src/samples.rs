use chrono::{DateTime, Utc};
use pitchboard_types::api::{AuthorCard, PitchCard};

struct SamplePitch {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    image: &'static str,
}

const SAMPLES: &[SamplePitch] = &[
    SamplePitch {
        title: "QuantumSecure - AI-Powered Cybersecurity",
        description: "Advanced AI-driven cybersecurity platform protecting enterprises from zero-day threats using quantum-resistant encryption.",
        category: "Cybersecurity",
        image: "https://images.unsplash.com/photo-1560707303-4e980ce876ad?w=800&h=600&fit=crop",
    },
    SamplePitch {
        title: "GreenFlow - Sustainable Supply Chain",
        description: "Blockchain-powered platform enabling real-time carbon tracking and optimization for supply chains.",
        category: "Sustainability",
        image: "https://images.unsplash.com/photo-1578502494516-2651a96eae5d?w=800&h=600&fit=crop",
    },
    SamplePitch {
        title: "MindFlow - Mental Health AI Assistant",
        description: "AI-powered digital mental health platform providing accessible therapy and wellness support.",
        category: "HealthTech",
        image: "https://images.unsplash.com/photo-1576091160550-2173dba999ef?w=800&h=600&fit=crop",
    },
    SamplePitch {
        title: "AgriTech Pro - Smart Farming Platform",
        description: "IoT and AI-driven precision agriculture platform helping farmers maximize yields and reduce costs.",
        category: "AgriTech",
        image: "https://images.unsplash.com/photo-1574943320219-553eb213f72d?w=800&h=600&fit=crop",
    },
    SamplePitch {
        title: "BlockChain Pay - Web3 Payment Gateway",
        description: "Instant, low-cost cross-border payment solution using blockchain technology.",
        category: "FinTech",
        image: "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=800&h=600&fit=crop",
    },
];

/// Static demo entries shown alongside real pitches. They get the Unix-epoch
/// sentinel timestamp so persisted pitches always sort ahead of them.
pub fn demo_cards() -> Vec<PitchCard> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| PitchCard {
            id: format!("sample-{i}"),
            title: s.title.to_string(),
            description: s.description.to_string(),
            category: s.category.to_string(),
            image: s.image.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            author: Some(AuthorCard {
                id: "demo-author".to_string(),
                name: "PitchBoard Demo".to_string(),
                username: "pitchboard-demo".to_string(),
                image: "https://api.dicebear.com/7.x/avataaars/svg?seed=demo".to_string(),
            }),
        })
        .collect()
}
