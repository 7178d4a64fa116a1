pub mod spn_framework {
    pub mod activity_key;
    pub mod exportable;
    pub mod importable;
    pub mod infoable;
    pub mod spn_command;
    pub mod spn_object;
}
pub mod spn_commands {
    pub mod spn_command_augment;
    pub mod spn_command_info;
    pub mod spn_command_simulate;
    pub mod spn_command_weights;
}
pub mod spn_objects {
    pub mod alignments;
    pub mod augmented_net;
    pub mod event_log;
    pub mod petri_net;
    pub mod simulated_log;
    pub mod stochastic_petri_net;
    pub mod stochastic_petri_net_semantics;
    pub mod weight_table;
}
pub mod spn_traits {
    pub mod semantics;
}
pub mod techniques {
    pub mod augmentation;
    pub mod frequency_weights;
    pub mod manual_weights;
    pub mod sample;
    pub mod token_game;
    pub mod uniform_weights;
    pub mod weights;
}
pub mod json;
pub mod line_reader;
pub mod marking;
pub mod simulation_error;
